use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{info, warn};

use crate::io::order_store::{OrderStore, StoreError};
use crate::model::{Node, TaskOrder};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Tasks updated!";

/// Error type for order submission
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Error updating task order.")]
    Store(#[from] StoreError),
}

/// Map a final sequence to an order batch: positions are 1-based and dense,
/// parents are taken as they are.
pub fn build_batch(sequence: &[Node], organization_id: &str) -> Vec<TaskOrder> {
    sequence
        .iter()
        .enumerate()
        .map(|(i, node)| TaskOrder {
            task_id: node.id.clone(),
            parent_id: node.parent.clone(),
            order: (i + 1).to_string(),
            organization_id: organization_id.to_string(),
        })
        .collect()
}

/// Sends order batches to an [`OrderStore`] and tracks whether one is in
/// flight.
///
/// Submissions are not serialized: a second drag may submit while the first
/// is pending, and the store sees both in completion order.
pub struct Submitter<S> {
    store: S,
    organization_id: String,
    success_message: String,
    in_flight: AtomicUsize,
}

impl<S: OrderStore> Submitter<S> {
    pub fn new(store: S, organization_id: impl Into<String>) -> Self {
        Submitter {
            store,
            organization_id: organization_id.into(),
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// True while at least one submission has not completed
    pub fn is_updating_task_order(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Persist the order of `sequence`. Returns the confirmation message
    /// (`message` if given, otherwise the configured one).
    pub async fn submit(&self, sequence: &[Node], message: Option<&str>) -> Result<String, SubmitError> {
        let batch = build_batch(sequence, &self.organization_id);
        let _guard = InFlight::enter(&self.in_flight);

        match self.store.update_task_order(&batch).await {
            Ok(()) => {
                info!(entries = batch.len(), "task order updated");
                Ok(message.unwrap_or(&self.success_message).to_string())
            }
            Err(e) => {
                warn!(error = %e, entries = batch.len(), "task order update failed");
                Err(SubmitError::Store(e))
            }
        }
    }
}

/// Counts one in-flight submission until dropped
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        InFlight(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    use super::*;

    #[derive(Default)]
    struct RecordingStore {
        batches: Mutex<Vec<Vec<TaskOrder>>>,
        fail: bool,
    }

    #[async_trait]
    impl OrderStore for RecordingStore {
        async fn update_task_order(&self, batch: &[TaskOrder]) -> Result<(), StoreError> {
            self.batches.lock().unwrap().push(batch.to_vec());
            if self.fail {
                Err(StoreError::Unavailable("offline".into()))
            } else {
                Ok(())
            }
        }
    }

    struct GatedStore {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl OrderStore for GatedStore {
        async fn update_task_order(&self, _batch: &[TaskOrder]) -> Result<(), StoreError> {
            self.gate.notified().await;
            Ok(())
        }
    }

    fn seq() -> Vec<Node> {
        vec![
            Node::list("L", "l"),
            Node::task("C1", "c1").with_parent("L"),
            Node::task("R1", "r1"),
        ]
    }

    #[test]
    fn batch_orders_are_dense_and_one_based() {
        let batch = build_batch(&seq(), "org-1");
        let orders: Vec<&str> = batch.iter().map(|o| o.order.as_str()).collect();
        assert_eq!(orders, vec!["1", "2", "3"]);
        assert_eq!(batch[1].parent_id.as_deref(), Some("L"));
        assert_eq!(batch[2].parent_id, None);
        assert!(batch.iter().all(|o| o.organization_id == "org-1"));
    }

    #[test]
    fn batch_wire_format() {
        let batch = build_batch(&seq()[1..2], "org");
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "taskId": "C1",
                "parentId": "L",
                "order": "1",
                "organizationId": "org"
            }])
        );
    }

    #[tokio::test]
    async fn successful_submit_returns_message() {
        let submitter = Submitter::new(RecordingStore::default(), "org");
        let msg = submitter.submit(&seq(), None).await.unwrap();
        assert_eq!(msg, "Tasks updated!");
        let msg = submitter.submit(&seq(), Some("Moved")).await.unwrap();
        assert_eq!(msg, "Moved");
        assert_eq!(submitter.store().batches.lock().unwrap().len(), 2);
        assert!(!submitter.is_updating_task_order());
    }

    #[tokio::test]
    async fn failed_submit_reports_generic_error() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let submitter = Submitter::new(store, "org").with_success_message("ok");
        let err = submitter.submit(&seq(), None).await.unwrap_err();
        assert_eq!(err.to_string(), "Error updating task order.");
        assert!(!submitter.is_updating_task_order());
    }

    #[tokio::test]
    async fn flag_is_set_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let submitter = Arc::new(Submitter::new(GatedStore { gate: gate.clone() }, "org"));
        assert!(!submitter.is_updating_task_order());

        let pending = {
            let submitter = submitter.clone();
            tokio::spawn(async move { submitter.submit(&seq(), None).await })
        };

        tokio::time::timeout(Duration::from_secs(5), async {
            while !submitter.is_updating_task_order() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        gate.notify_one();
        pending.await.unwrap().unwrap();
        assert!(!submitter.is_updating_task_order());
    }
}

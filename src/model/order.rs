use serde::{Deserialize, Serialize};

/// One row of an order batch handed to the order persistence service.
///
/// `order` is the 1-based position of the node in the final sequence,
/// carried as a string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOrder {
    pub task_id: String,
    pub parent_id: Option<String>,
    pub order: String,
    pub organization_id: String,
}

impl TaskOrder {
    /// Numeric position, if the order string is well formed
    pub fn position(&self) -> Option<usize> {
        self.order.parse().ok()
    }
}

//! The order persistence service and its file-backed implementation.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::io::board_io::{ProjectError, read_board, save_board};
use crate::io::lock::{FileLock, LockError};
use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::model::{BoardError, TaskOrder};

/// Error type for order persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Lock(#[from] LockError),
    #[error("{0}")]
    Project(#[from] ProjectError),
    #[error("order batch rejected: {0}")]
    Rejected(#[from] BoardError),
    #[error("order store task failed: {0}")]
    Task(String),
    #[error("order store unavailable: {0}")]
    Unavailable(String),
}

/// Accepts a full order batch and applies it all-or-nothing.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn update_task_order(&self, batch: &[TaskOrder]) -> Result<(), StoreError>;
}

/// Applies batches to `board.json` under the board's advisory lock.
///
/// A batch that cannot be stored is appended to the recovery log.
#[derive(Debug, Clone)]
pub struct FileOrderStore {
    board_dir: PathBuf,
}

impl FileOrderStore {
    pub fn new(board_dir: impl Into<PathBuf>) -> Self {
        FileOrderStore {
            board_dir: board_dir.into(),
        }
    }

    pub fn board_dir(&self) -> &Path {
        &self.board_dir
    }
}

#[async_trait]
impl OrderStore for FileOrderStore {
    async fn update_task_order(&self, batch: &[TaskOrder]) -> Result<(), StoreError> {
        let board_dir = self.board_dir.clone();
        let batch = batch.to_vec();
        tokio::task::spawn_blocking(move || {
            let result = apply_batch(&board_dir, &batch);
            if let Err(e) = &result {
                record_failed_batch(&board_dir, &batch, e);
            }
            result
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn apply_batch(board_dir: &Path, batch: &[TaskOrder]) -> Result<(), StoreError> {
    let _lock = FileLock::acquire_default(board_dir)?;
    let mut board = read_board(board_dir)?;
    board.apply_orders(batch)?;
    save_board(board_dir, &board)?;
    debug!(entries = batch.len(), "order batch written");
    Ok(())
}

fn record_failed_batch(board_dir: &Path, batch: &[TaskOrder], error: &StoreError) {
    warn!(error = %error, "order batch not stored");
    let category = match error {
        StoreError::Rejected(_) => RecoveryCategory::Conflict,
        _ => RecoveryCategory::Write,
    };
    let body = serde_json::to_string_pretty(batch).unwrap_or_default();
    log_recovery(
        board_dir,
        RecoveryEntry::new(category, "order batch not stored")
            .field("Entries", batch.len().to_string())
            .field("Error", error.to_string())
            .body(body),
    );
}

/// Keeps every batch in memory. Useful for hosts without a backend and in
/// tests.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    batches: Mutex<Vec<Vec<TaskOrder>>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Vec<TaskOrder>> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn last_batch(&self) -> Option<Vec<TaskOrder>> {
        self.batches().pop()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn update_task_order(&self, batch: &[TaskOrder]) -> Result<(), StoreError> {
        self.batches
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .push(batch.to_vec());
        Ok(())
    }
}

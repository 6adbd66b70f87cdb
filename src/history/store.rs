// src/history/store.rs

use std::fmt;

use async_trait::async_trait;

/// Failure talking to the external tabular store. The message is kept for
/// logging only; callers degrade rather than surface it.
#[derive(Debug)]
pub enum HistoryError {
    /// Transport-level failure (connect, timeout, decode).
    Request(String),

    /// The store answered with a non-success status.
    Rejected(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Request(msg) => write!(f, "history store request failed: {}", msg),
            HistoryError::Rejected(msg) => write!(f, "history store rejected call: {}", msg),
        }
    }
}

impl std::error::Error for HistoryError {}

/// Boundary to the externally-owned tabular history store.
///
/// The store's lifecycle is not ours: this system only appends rows and
/// reads them back for display. There is no read-modify-write, so
/// concurrent sessions cannot meaningfully race on it.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends one row. At-most-once: no retry, no idempotency key.
    async fn append_row(&self, cells: Vec<String>) -> Result<(), HistoryError>;

    /// Reads every row for the history view.
    async fn read_all(&self) -> Result<Vec<Vec<String>>, HistoryError>;
}

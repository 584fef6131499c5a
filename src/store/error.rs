use thiserror::Error;

/// Failures of the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
    /// Another transaction committed a write to the same row after this
    /// transaction's snapshot was taken.
    #[error("concurrent write on {table}/{key}: expected version {expected}, found {actual}")]
    ConcurrentWrite {
        table: String,
        key: String,
        expected: u64,
        actual: u64,
    },
    #[error("failed to encode {table}/{key}: {reason}")]
    Encode {
        table: String,
        key: String,
        reason: String,
    },
    #[error("failed to decode {table}/{key}: {reason}")]
    Decode {
        table: String,
        key: String,
        reason: String,
    },
    #[error("outbox record {0} not found")]
    RecordNotFound(u64),
    #[error("commit failed: {0}")]
    CommitFailed(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::ConcurrentWrite { .. } | StoreError::CommitFailed(_)
        )
    }
}

use thiserror::Error;

use crate::context::ContextError;

/// Error type for lock operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// A non-blocking acquire found the lock taken by a live holder.
    #[error("lock {0} is held by another owner")]
    Held(String),
    /// The wait for a contended lock hit its bound.
    #[error("timed out waiting for lock {0}")]
    Timeout(String),
    /// The token's TTL elapsed and the lock now belongs to someone else (or nobody).
    #[error("lock {0} expired before it was released")]
    Expired(String),
    /// The caller's context was cancelled or passed its deadline while waiting.
    #[error("lock wait interrupted: {0}")]
    Interrupted(#[from] ContextError),
    /// The underlying primitive was poisoned (a thread panicked while holding it).
    #[error("lock state poisoned: {0}")]
    Poisoned(String),
}

impl LockError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LockError::Held(_) | LockError::Timeout(_) | LockError::Expired(_)
        )
    }
}

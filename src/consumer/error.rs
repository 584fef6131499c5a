use thiserror::Error;

use crate::error::Error;

/// Why a delivery could not be consumed.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The payload does not match the schema registered for its type.
    /// Terminal for this message: redelivery cannot fix it.
    #[error("malformed {event_type} payload: {reason}")]
    Malformed { event_type: String, reason: String },
    /// The business handler failed.
    #[error("handler for {event_type} failed: {source}")]
    Handler {
        event_type: String,
        #[source]
        source: Error,
    },
}

impl ConsumerError {
    /// Whether redelivering the same message may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConsumerError::Malformed { .. } => false,
            ConsumerError::Handler { source, .. } => source.is_retryable(),
        }
    }
}

use super::{Delivery, PublishError};

/// Pull-based, at-least-once consumption.
///
/// Every delivery must be answered with `ack` (processed, drop it) or
/// `nack` (failed, redeliver or dead-letter per transport policy).
pub trait Subscriber: Send + Sync {
    /// Wait up to `timeout_ms` for the next delivery.
    fn poll(&self, timeout_ms: u64) -> Result<Option<Delivery>, PublishError>;

    fn ack(&self, message_id: &str) -> Result<(), PublishError>;

    fn nack(&self, message_id: &str, reason: &str) -> Result<(), PublishError>;
}

impl<S: Subscriber + ?Sized> Subscriber for std::sync::Arc<S> {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Delivery>, PublishError> {
        (**self).poll(timeout_ms)
    }

    fn ack(&self, message_id: &str) -> Result<(), PublishError> {
        (**self).ack(message_id)
    }

    fn nack(&self, message_id: &str, reason: &str) -> Result<(), PublishError> {
        (**self).nack(message_id, reason)
    }
}

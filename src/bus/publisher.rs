use super::{Message, PublishError};

/// Trait for publishing messages to a transport.
///
/// A successful return means the transport accepted the message; only then
/// may the relay mark the outbox record dispatched.
pub trait Publisher: Send + Sync {
    fn publish(&self, message: Message) -> Result<(), PublishError>;
}

impl<P: Publisher + ?Sized> Publisher for std::sync::Arc<P> {
    fn publish(&self, message: Message) -> Result<(), PublishError> {
        (**self).publish(message)
    }
}

use thiserror::Error;

use crate::outbox::{epoch_seconds, OutboxRecord};

/// A message on the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Unique per outbox record; redeliveries keep the same id.
    pub id: String,
    /// Integration event type, e.g. `order_created`.
    pub event_type: String,
    /// JSON payload.
    pub payload: Vec<u8>,
    /// Optional headers (origin app, record id, ...).
    pub metadata: Option<Vec<(String, String)>>,
}

/// What a consumer receives: a message as delivered by its subscriber.
pub type Delivery = Message;

impl Message {
    pub fn new(id: impl Into<String>, event_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            payload,
            metadata: None,
        }
    }

    /// Create a message whose payload is `payload` serialized as JSON.
    pub fn encode<T: serde::Serialize>(
        id: impl Into<String>,
        event_type: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(id, event_type, serde_json::to_vec(payload)?))
    }

    /// Decode the JSON payload.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    pub fn with_string_payload(
        id: impl Into<String>,
        event_type: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self::new(id, event_type, payload.into().into_bytes())
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

impl From<&OutboxRecord> for Message {
    fn from(record: &OutboxRecord) -> Self {
        Message::with_string_payload(record.message_id(), &record.event_type, record.payload.clone())
            .with_metadata("app_id", &record.app_id)
            .with_metadata("record_id", record.id.to_string())
            .with_metadata("created_at", epoch_seconds(record.created_at).to_string())
    }
}

/// Error type for transport operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("message rejected: {0}")]
    Rejected(String),
    #[error("publish timeout")]
    Timeout,
    #[error("unknown message {0}")]
    UnknownMessage(String),
    #[error("transport error: {0}")]
    Other(String),
}

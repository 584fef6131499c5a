use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// One committed integration event waiting for (or past) publication.
///
/// A record exists only if the transaction that appended it committed.
/// `dispatched_at` is set exactly once, by the relay, after the transport
/// accepted the message.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct OutboxRecord {
    /// Creation sequence; the relay publishes in ascending order.
    pub id: u64,
    pub app_id: String,
    pub transport: String,
    pub event_type: String,
    pub payload: String,
    pub created_at: SystemTime,
    pub dispatched_at: Option<SystemTime>,
}

impl OutboxRecord {
    pub fn is_dispatched(&self) -> bool {
        self.dispatched_at.is_some()
    }

    /// Stable transport message id. Redeliveries of the same record share it.
    pub fn message_id(&self) -> String {
        format!("{}-{}", self.app_id, self.id)
    }
}

/// An outbox row staged inside a transaction, before it has an id.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRecord {
    pub app_id: String,
    pub transport: String,
    pub event_type: String,
    pub payload: String,
    pub created_at: SystemTime,
}

impl PendingRecord {
    pub(crate) fn into_record(self, id: u64) -> OutboxRecord {
        OutboxRecord {
            id,
            app_id: self.app_id,
            transport: self.transport,
            event_type: self.event_type,
            payload: self.payload,
            created_at: self.created_at,
            dispatched_at: None,
        }
    }
}

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;

use crate::domain::DomainEvent;

/// Failures turning events into (or out of) their integration schemas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    /// No schema is registered for this event type. A programming error:
    /// the registry is built at startup and must cover every emitted event.
    #[error("unknown event {0}")]
    UnknownEvent(String),
    #[error("failed to encode {event_type}: {reason}")]
    Encode { event_type: String, reason: String },
    #[error("failed to decode {event_type}: {reason}")]
    Decode { event_type: String, reason: String },
}

/// An event in its integration form, ready for the outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedEvent {
    /// Integration name consumers switch on, e.g. `order_created`.
    pub event_type: &'static str,
    pub payload: String,
}

type Encoder = Box<dyn Fn(&dyn DomainEvent) -> Option<Result<String, serde_json::Error>> + Send + Sync>;

struct Schema {
    name: &'static str,
    encode: Encoder,
}

/// Explicit mapping from domain event types to integration schemas.
///
/// Each entry pairs a Rust event type with its integration name and a
/// conversion into a serializable schema struct. Built once at startup and
/// shared by every dispatcher of the process.
///
/// ```ignore
/// let schemas = EventSchemas::new()
///     .register("order_created", |e: &OrderCreated| OrderCreatedSchema::from(e))
///     .register("order_deleted", |e: &OrderDeleted| OrderDeletedSchema::from(e));
/// ```
#[derive(Default)]
pub struct EventSchemas {
    schemas: HashMap<TypeId, Schema>,
}

impl EventSchemas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E` under the integration name `name`. A second registration
    /// for the same type replaces the first.
    pub fn register<E, S, F>(mut self, name: &'static str, to_schema: F) -> Self
    where
        E: DomainEvent + 'static,
        S: Serialize,
        F: Fn(&E) -> S + Send + Sync + 'static,
    {
        let encode: Encoder = Box::new(move |event: &dyn DomainEvent| {
            event
                .as_any()
                .downcast_ref::<E>()
                .map(|event| serde_json::to_string(&to_schema(event)))
        });
        self.schemas
            .insert(TypeId::of::<E>(), Schema { name, encode });
        self
    }

    /// Combine two registries. Entries of `other` win on conflict.
    pub fn merge(mut self, other: EventSchemas) -> Self {
        self.schemas.extend(other.schemas);
        self
    }

    pub fn contains(&self, event: &dyn DomainEvent) -> bool {
        self.schemas.contains_key(&event.as_any().type_id())
    }

    /// Registered integration names, sorted.
    pub fn integration_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.schemas.values().map(|s| s.name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn serialize(&self, event: &dyn DomainEvent) -> Result<SerializedEvent, SerializationError> {
        let schema = self
            .schemas
            .get(&event.as_any().type_id())
            .ok_or_else(|| SerializationError::UnknownEvent(event.event_type().to_string()))?;

        match (schema.encode)(event) {
            Some(Ok(payload)) => Ok(SerializedEvent {
                event_type: schema.name,
                payload,
            }),
            Some(Err(e)) => Err(SerializationError::Encode {
                event_type: schema.name.to_string(),
                reason: e.to_string(),
            }),
            None => Err(SerializationError::UnknownEvent(event.event_type().to_string())),
        }
    }
}

impl fmt::Debug for EventSchemas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSchemas")
            .field("events", &self.integration_names())
            .finish()
    }
}

/// Whole seconds since the Unix epoch, the timestamp format of every schema.
pub fn epoch_seconds(at: SystemTime) -> i64 {
    match at.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
        Err(before) => -i64::try_from(before.duration().as_secs()).unwrap_or(i64::MAX),
    }
}

//! Outbox-pattern event publication, producer side.
//!
//! Domain events are serialized through an explicit [`EventSchemas`] registry
//! and appended to the outbox table inside the caller's transaction, so "state
//! changed" and "announce the change" commit or roll back together. The relay
//! in [`crate::relay`] picks committed rows up later.
//!
//! ```text
//! UnitOfWork::execute ──► domain service ──► Emitted { value, events }
//!                                                  │
//!                          TxDispatcher::dispatch ◄┘
//!                                  │ EventSchemas::serialize
//!                                  ▼
//!                      outbox row (same transaction)
//! ```

mod dispatcher;
mod record;
mod schema;

pub use dispatcher::{EventDispatcher, TxDispatcher};
pub use record::{OutboxRecord, PendingRecord};
pub use schema::{epoch_seconds, EventSchemas, SerializationError, SerializedEvent};

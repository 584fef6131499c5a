//! Inbound events: typed dispatch of deliveries to idempotent handlers.
//!
//! Handlers run their business logic inside a unit of work and write with
//! upsert semantics keyed by the event's natural id, so a redelivered message
//! converges to the same state.

mod error;
mod handlers;
mod thread;

pub use error::ConsumerError;
pub use handlers::{Consumed, EventConsumer, EventHandlers};
pub use thread::{ConsumerStats, EventConsumerThread};

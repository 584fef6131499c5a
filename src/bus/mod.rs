//! Transport abstractions.
//!
//! ```text
//! ┌──────────────┐   publish    ┌────────────────────┐   poll/ack/nack   ┌──────────────┐
//! │ OutboxRelay  │ ───────────► │ Publisher          │                   │ EventConsumer│
//! └──────────────┘              │        Subscriber  │ ◄──────────────── └──────────────┘
//!                               └────────────────────┘
//!                        InMemoryQueue (included), Kafka/NATS/... (external)
//! ```
//!
//! Delivery is at-least-once: a message may arrive more than once, so every
//! consumer handler must be idempotent.

mod in_memory_queue;
mod message;
mod publisher;
mod subscriber;

pub use in_memory_queue::{InMemoryQueue, DEFAULT_MAX_DELIVERIES};
pub use message::{Delivery, Message, PublishError};
pub use publisher::Publisher;
pub use subscriber::Subscriber;

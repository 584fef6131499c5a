//! Local transactional storage.
//!
//! [`Database`] opens [`Transaction`]s over keyed tables of opaque rows plus
//! the outbox table; [`OutboxStore`] is the relay's view of that table.
//! [`InMemoryStore`] implements all three and is what the tests and
//! single-process deployments run on.

mod database;
mod error;
mod in_memory;

pub use database::{Database, OutboxStore, Transaction};
pub use error::StoreError;
pub use in_memory::InMemoryStore;

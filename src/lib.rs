//! Transactional outbox for services that keep their state and their
//! outgoing events in one store.
//!
//! A [`UnitOfWork`] runs a closure inside one store transaction; aggregates
//! written through its repositories and events dispatched through its
//! [`EventDispatcher`] commit or roll back together. A [`LockableUnitOfWork`]
//! additionally serializes callers on named TTL locks. An [`OutboxRelay`]
//! publishes committed events at least once, and an [`EventConsumer`] routes
//! delivered messages to typed handlers.
//!
//! ```
//! use std::sync::Arc;
//!
//! use transactional_outbox::bus::InMemoryQueue;
//! use transactional_outbox::domain::payment::{self, PaymentApp};
//! use transactional_outbox::lock::InMemoryLockManager;
//! use transactional_outbox::outbox::EventDispatcher;
//! use transactional_outbox::store::InMemoryStore;
//! use transactional_outbox::{
//!     Context, LockableUnitOfWork, OutboxRelay, RelayConfig, UnitOfWork,
//! };
//!
//! let store = InMemoryStore::new();
//! let dispatcher = EventDispatcher::new("payment", "default", payment::integration::schemas());
//! let uow = UnitOfWork::new(store.clone(), dispatcher);
//! let payments = PaymentApp::new(LockableUnitOfWork::new(uow, Arc::new(InMemoryLockManager::new())));
//!
//! let customer = uuid::Uuid::new_v4();
//! payments.store_user_balance(&Context::background(), customer, 100).unwrap();
//!
//! let queue = InMemoryQueue::new();
//! let relay = OutboxRelay::new(store, queue.clone(), RelayConfig::default());
//! relay.drain().unwrap();
//!
//! assert_eq!(queue.event_types(), vec!["customer_account_created", "customer_amount_updated"]);
//! ```

pub mod bus;
pub mod config;
pub mod consumer;
pub mod context;
pub mod domain;
mod error;
pub mod lock;
pub mod outbox;
pub mod relay;
pub mod store;
pub mod uow;

pub use config::{BackoffConfig, Config, ConsumerConfig, RelayConfig, UnitOfWorkConfig};
pub use consumer::{EventConsumer, EventConsumerThread, EventHandlers};
pub use context::{Context, ContextError};
pub use error::{Error, Result};
pub use relay::{OutboxRelay, OutboxRelayThread};
pub use uow::{LockableUnitOfWork, UnitOfWork};

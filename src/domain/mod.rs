//! Business contexts and the building blocks they share.
//!
//! Every context follows the same layout: `model` (aggregates and the
//! context's error enum), `events`, a `service` working inside one unit of
//! work, an `app` that picks locks and transaction boundaries, and
//! `integration` (wire schemas plus inbound handlers).

mod aggregate;
mod error;
mod event;
mod service;

pub mod inventory;
pub mod notification;
pub mod order;
pub mod payment;
pub mod user;

pub use aggregate::{Aggregate, Audit, Lifecycle};
pub use error::DomainError;
pub use event::{AsAny, DomainEvent, Emitted};
pub use service::{Change, DomainService, Invariants, NoInvariants};

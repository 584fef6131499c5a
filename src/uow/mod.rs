//! Units of work.
//!
//! [`UnitOfWork`] wraps a closure in one local transaction;
//! [`LockableUnitOfWork`] additionally serializes it against other callers
//! through named locks. The closure receives a [`RepositoryProvider`] whose
//! repositories and dispatcher all share that transaction.
//!
//! ```ignore
//! let order_id = luow.execute(&ctx, &[format!("order_{id}")], |p| {
//!     let emitted = OrderService::new(p).save_order(id)?;
//!     p.emit(emitted)
//! })?;
//! ```

mod lockable;
mod provider;
mod repository;
mod unit_of_work;

pub use lockable::LockableUnitOfWork;
pub use provider::RepositoryProvider;
pub use repository::Repository;
pub use unit_of_work::UnitOfWork;

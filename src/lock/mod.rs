//! Named TTL locks.
//!
//! A [`LockManager`] hands out [`LockToken`]s for lock names such as
//! `order_42` or `balance_<customer>`. [`LockSet`] acquires several names in
//! the order given and releases them in reverse, which is what the lockable
//! unit of work builds on.
//!
//! Deadlock freedom is a caller contract: every code path that takes locks on
//! two kinds of resource must take them in the same global order (for example
//! `customer_*` before `order_*`).

mod error;
mod in_memory;
mod lock_manager;
mod lock_set;

pub use error::LockError;
pub use in_memory::InMemoryLockManager;
pub use lock_manager::{LockManager, LockToken};
pub use lock_set::LockSet;

use std::sync::Arc;

use tracing::{debug, warn};

use super::{RepositoryProvider, UnitOfWork};
use crate::config::UnitOfWorkConfig;
use crate::context::Context;
use crate::error::Result;
use crate::lock::{LockManager, LockSet};

/// A [`UnitOfWork`] that first takes a list of named locks.
///
/// Locks are acquired left to right (repeats collapse to the first
/// occurrence), the transaction runs and resolves, then the locks are released
/// last-first. Release happens on every exit path, including panics, because
/// the held [`LockSet`] releases on drop.
///
/// Two callers that lock the same pair of resource kinds must name them in
/// the same order, e.g. always `customer_<id>` before `order_<id>`. This type
/// cannot detect a violation; it shows up as a lock-wait timeout.
#[derive(Clone)]
pub struct LockableUnitOfWork {
    uow: UnitOfWork,
    locks: Arc<dyn LockManager>,
    config: UnitOfWorkConfig,
}

impl LockableUnitOfWork {
    pub fn new(uow: UnitOfWork, locks: Arc<dyn LockManager>) -> Self {
        Self {
            uow,
            locks,
            config: UnitOfWorkConfig::default(),
        }
    }

    pub fn with_config(mut self, config: UnitOfWorkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &UnitOfWorkConfig {
        &self.config
    }

    /// The unlocked unit of work underneath, for reads and single-row upserts.
    pub fn unit_of_work(&self) -> &UnitOfWork {
        &self.uow
    }

    pub fn execute<T, F, S>(&self, ctx: &Context, lock_names: &[S], f: F) -> Result<T>
    where
        F: FnOnce(&RepositoryProvider<'_>) -> Result<T>,
        S: AsRef<str>,
    {
        ctx.check()?;
        let wait_ctx = ctx.with_timeout(self.config.lock_wait);
        let held = LockSet::acquire(self.locks.as_ref(), &wait_ctx, lock_names, self.config.lock_ttl)?;
        debug!(locks = ?held.names(), "locks held");

        // A lock that expired mid-transaction may already have a new owner, so
        // committing would no longer be exclusive.
        let outcome = self
            .uow
            .execute_guarded(ctx, f, || held.ensure_live().map_err(Into::into));

        if let Err(err) = held.release() {
            // The transaction has already resolved; nothing left to undo.
            warn!(error = %err, "lock released after expiry");
        }
        outcome
    }
}

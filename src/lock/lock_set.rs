use std::time::Duration;

use tracing::error;

use super::{LockError, LockManager, LockToken};
use crate::context::Context;

/// A group of named locks acquired in order and released in reverse.
///
/// Dropping the set releases whatever it still holds, so every exit path
/// (early return, `?`, panic unwinding) gives the locks back.
pub struct LockSet<'m> {
    manager: &'m dyn LockManager,
    tokens: Vec<LockToken>,
}

impl<'m> LockSet<'m> {
    /// Acquire `names` left to right. A repeated name is only taken once.
    ///
    /// When any acquisition fails the locks taken so far are released
    /// (last first) before the error is returned.
    pub fn acquire<S: AsRef<str>>(
        manager: &'m dyn LockManager,
        ctx: &Context,
        names: &[S],
        ttl: Duration,
    ) -> Result<Self, LockError> {
        let mut set = Self {
            manager,
            tokens: Vec::with_capacity(names.len()),
        };
        for name in names {
            let name = name.as_ref();
            if set.tokens.iter().any(|t| t.name() == name) {
                continue;
            }
            let token = manager.acquire(ctx, name, ttl)?;
            set.tokens.push(token);
        }
        Ok(set)
    }

    /// Lock names in acquisition order.
    pub fn names(&self) -> Vec<&str> {
        self.tokens.iter().map(LockToken::name).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Fails with [`LockError::Expired`] if any held lock has outlived its TTL.
    pub fn ensure_live(&self) -> Result<(), LockError> {
        match self.tokens.iter().find(|t| t.is_expired()) {
            Some(token) => Err(LockError::Expired(token.name().to_string())),
            None => Ok(()),
        }
    }

    /// Release every lock, last acquired first. All locks are attempted; the
    /// first failure is returned.
    pub fn release(mut self) -> Result<(), LockError> {
        self.release_all()
    }

    fn release_all(&mut self) -> Result<(), LockError> {
        let mut first_err = None;
        while let Some(token) = self.tokens.pop() {
            if let Err(err) = self.manager.release(&token) {
                error!(lock = token.name(), error = %err, "failed to release lock");
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for LockSet<'_> {
    fn drop(&mut self) {
        let _ = self.release_all();
    }
}

impl std::fmt::Debug for LockSet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockSet")
            .field("tokens", &self.tokens)
            .finish()
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::LockError;
use crate::context::Context;

/// Proof of holding a named lock.
///
/// The holder id is unique per acquisition, so a token from an expired
/// acquisition can never release a lock that was re-acquired by someone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken {
    name: String,
    holder: Uuid,
    expires_at: Instant,
}

impl LockToken {
    pub fn new(name: impl Into<String>, holder: Uuid, expires_at: Instant) -> Self {
        Self {
            name: name.into(),
            holder,
            expires_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn holder(&self) -> Uuid {
        self.holder
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Named mutual exclusion with a TTL.
///
/// At most one live holder exists per name. Expiry is a safety net for
/// crashed holders: the happy path always calls [`release`](Self::release).
/// The in-process [`InMemoryLockManager`](super::InMemoryLockManager) is the
/// default; a distributed implementation would keep the same contract on top
/// of Redis, Postgres advisory locks, etc.
pub trait LockManager: Send + Sync {
    /// Take the lock if it is free right now, otherwise fail with [`LockError::Held`].
    fn try_acquire(&self, name: &str, ttl: Duration) -> Result<LockToken, LockError>;

    /// Block until the lock is free, the context is cancelled, or the context's
    /// deadline passes ([`LockError::Timeout`]).
    fn acquire(&self, ctx: &Context, name: &str, ttl: Duration) -> Result<LockToken, LockError>;

    /// Release a lock previously acquired with `token`.
    ///
    /// Fails with [`LockError::Expired`] when the token no longer owns the lock;
    /// the current owner, if any, is left untouched.
    fn release(&self, token: &LockToken) -> Result<(), LockError>;
}

impl<M: LockManager + ?Sized> LockManager for Arc<M> {
    fn try_acquire(&self, name: &str, ttl: Duration) -> Result<LockToken, LockError> {
        (**self).try_acquire(name, ttl)
    }

    fn acquire(&self, ctx: &Context, name: &str, ttl: Duration) -> Result<LockToken, LockError> {
        (**self).acquire(ctx, name, ttl)
    }

    fn release(&self, token: &LockToken) -> Result<(), LockError> {
        (**self).release(token)
    }
}

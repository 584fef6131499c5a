use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use uuid::Uuid;

use super::{LockError, LockManager, LockToken};
use crate::context::{Context, ContextError};

/// Upper bound on a single condvar wait, so a cancelled context is noticed
/// even when nobody releases the lock.
const CANCEL_POLL: Duration = Duration::from_millis(10);

#[derive(Debug)]
struct Holder {
    token: Uuid,
    expires_at: Instant,
}

/// In-process lock manager backed by `Mutex<HashMap<..>>` + `Condvar`.
///
/// Expired entries are reclaimed lazily by the next acquirer.
#[derive(Debug, Default)]
pub struct InMemoryLockManager {
    held: Mutex<HashMap<String, Holder>>,
    released: Condvar,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` currently has a live holder.
    pub fn is_held(&self, name: &str) -> bool {
        self.state()
            .map(|held| {
                held.get(name)
                    .is_some_and(|h| h.expires_at > Instant::now())
            })
            .unwrap_or(false)
    }

    fn state(&self) -> Result<MutexGuard<'_, HashMap<String, Holder>>, LockError> {
        self.held
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))
    }

    fn grant(
        held: &mut HashMap<String, Holder>,
        name: &str,
        ttl: Duration,
        now: Instant,
    ) -> LockToken {
        let holder = Uuid::new_v4();
        let expires_at = now + ttl;
        if let Some(previous) = held.insert(
            name.to_string(),
            Holder {
                token: holder,
                expires_at,
            },
        ) {
            warn!(lock = name, previous = %previous.token, "reclaimed expired lock");
        }
        debug!(lock = name, holder = %holder, "lock acquired");
        LockToken::new(name, holder, expires_at)
    }
}

impl LockManager for InMemoryLockManager {
    fn try_acquire(&self, name: &str, ttl: Duration) -> Result<LockToken, LockError> {
        let mut held = self.state()?;
        let now = Instant::now();
        match held.get(name) {
            Some(current) if current.expires_at > now => Err(LockError::Held(name.to_string())),
            _ => Ok(Self::grant(&mut held, name, ttl, now)),
        }
    }

    fn acquire(&self, ctx: &Context, name: &str, ttl: Duration) -> Result<LockToken, LockError> {
        let mut held = self.state()?;
        loop {
            let now = Instant::now();
            let expires_at = match held.get(name) {
                Some(current) if current.expires_at > now => current.expires_at,
                _ => return Ok(Self::grant(&mut held, name, ttl, now)),
            };

            if ctx.is_cancelled() {
                return Err(LockError::Interrupted(ContextError::Cancelled));
            }
            let mut wait = (expires_at - now).min(CANCEL_POLL);
            if let Some(deadline) = ctx.deadline() {
                if deadline <= now {
                    debug!(lock = name, "gave up waiting for lock");
                    return Err(LockError::Timeout(name.to_string()));
                }
                wait = wait.min(deadline - now);
            }

            let (guard, _) = self
                .released
                .wait_timeout(held, wait)
                .map_err(|e| LockError::Poisoned(e.to_string()))?;
            held = guard;
        }
    }

    fn release(&self, token: &LockToken) -> Result<(), LockError> {
        let mut held = self.state()?;
        match held.get(token.name()) {
            Some(current) if current.token == token.holder() => {
                held.remove(token.name());
                self.released.notify_all();
                debug!(lock = token.name(), holder = %token.holder(), "lock released");
                Ok(())
            }
            _ => Err(LockError::Expired(token.name().to_string())),
        }
    }
}

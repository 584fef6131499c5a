use std::sync::Arc;

use tracing::debug;

use super::RepositoryProvider;
use crate::context::Context;
use crate::error::Result;
use crate::outbox::EventDispatcher;
use crate::store::Database;

/// Runs a closure inside exactly one local transaction.
///
/// The closure's repository writes and outbox appends commit together when it
/// returns `Ok`, and are discarded when it returns `Err`, when the context is
/// done before commit, or when it panics.
#[derive(Clone)]
pub struct UnitOfWork {
    db: Arc<dyn Database>,
    dispatcher: EventDispatcher,
}

impl UnitOfWork {
    pub fn new(db: impl Database + 'static, dispatcher: EventDispatcher) -> Self {
        Self {
            db: Arc::new(db),
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn execute<T, F>(&self, ctx: &Context, f: F) -> Result<T>
    where
        F: FnOnce(&RepositoryProvider<'_>) -> Result<T>,
    {
        self.execute_guarded(ctx, f, || Ok(()))
    }

    /// Like [`execute`](Self::execute), running `before_commit` as a last check.
    pub(crate) fn execute_guarded<T, F, G>(&self, ctx: &Context, f: F, before_commit: G) -> Result<T>
    where
        F: FnOnce(&RepositoryProvider<'_>) -> Result<T>,
        G: FnOnce() -> Result<()>,
    {
        ctx.check()?;
        let tx = self.db.begin()?;

        let outcome = {
            let provider = RepositoryProvider::new(tx.as_ref(), ctx, &self.dispatcher);
            f(&provider)
        };

        let value = match outcome.and_then(|value| {
            ctx.check()?;
            before_commit()?;
            Ok(value)
        }) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "rolling back unit of work");
                tx.rollback();
                return Err(err);
            }
        };

        tx.commit()?;
        Ok(value)
    }
}

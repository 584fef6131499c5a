use crate::context::Context;
use crate::domain::{Aggregate, Emitted};
use crate::error::Result;
use crate::outbox::{EventDispatcher, TxDispatcher};
use crate::store::Transaction;

use super::Repository;

/// Repositories and the outbox dispatcher of one open transaction.
///
/// A fresh provider is handed to every unit-of-work closure; everything it
/// returns is bound to that closure's transaction and cannot outlive it.
pub struct RepositoryProvider<'tx> {
    tx: &'tx dyn Transaction,
    ctx: &'tx Context,
    dispatcher: &'tx EventDispatcher,
}

impl<'tx> RepositoryProvider<'tx> {
    pub(crate) fn new(
        tx: &'tx dyn Transaction,
        ctx: &'tx Context,
        dispatcher: &'tx EventDispatcher,
    ) -> Self {
        Self { tx, ctx, dispatcher }
    }

    pub fn repository<A: Aggregate>(&self) -> Repository<'tx, A> {
        Repository::new(self.tx, self.ctx)
    }

    pub fn dispatcher(&self) -> TxDispatcher<'tx> {
        self.dispatcher.bind(self.tx, self.ctx)
    }

    pub fn context(&self) -> &'tx Context {
        self.ctx
    }

    /// Stage `emitted`'s events in the outbox and hand back its value.
    pub fn emit<T>(&self, emitted: Emitted<T>) -> Result<T> {
        self.dispatcher().dispatch_all(&emitted.events)?;
        Ok(emitted.value)
    }
}

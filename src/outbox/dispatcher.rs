use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use super::{EventSchemas, PendingRecord};
use crate::context::Context;
use crate::domain::DomainEvent;
use crate::error::Result;
use crate::store::Transaction;

/// Process-wide outbox settings: who we are, where events go, and how they
/// are serialized.
#[derive(Clone, Debug)]
pub struct EventDispatcher {
    app_id: String,
    transport: String,
    schemas: Arc<EventSchemas>,
}

impl EventDispatcher {
    pub fn new(app_id: impl Into<String>, transport: impl Into<String>, schemas: EventSchemas) -> Self {
        Self {
            app_id: app_id.into(),
            transport: transport.into(),
            schemas: Arc::new(schemas),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn transport(&self) -> &str {
        &self.transport
    }

    pub fn schemas(&self) -> &EventSchemas {
        &self.schemas
    }

    pub(crate) fn bind<'tx>(&'tx self, tx: &'tx dyn Transaction, ctx: &'tx Context) -> TxDispatcher<'tx> {
        TxDispatcher {
            settings: self,
            tx,
            ctx,
        }
    }
}

/// A dispatcher bound to one open transaction.
///
/// Dispatching only stages an outbox row; the row becomes visible to the
/// relay when (and only if) the transaction commits. No network call is made.
#[derive(Clone, Copy)]
pub struct TxDispatcher<'tx> {
    settings: &'tx EventDispatcher,
    tx: &'tx dyn Transaction,
    ctx: &'tx Context,
}

impl TxDispatcher<'_> {
    pub fn dispatch(&self, event: &dyn DomainEvent) -> Result<()> {
        self.ctx.check()?;
        let serialized = self.settings.schemas.serialize(event)?;
        debug!(
            event_type = serialized.event_type,
            transport = %self.settings.transport,
            "event staged in outbox"
        );
        self.tx.append_outbox(PendingRecord {
            app_id: self.settings.app_id.clone(),
            transport: self.settings.transport.clone(),
            event_type: serialized.event_type.to_string(),
            payload: serialized.payload,
            created_at: SystemTime::now(),
        })?;
        Ok(())
    }

    pub fn dispatch_all(&self, events: &[Box<dyn DomainEvent>]) -> Result<()> {
        for event in events {
            self.dispatch(event.as_ref())?;
        }
        Ok(())
    }
}

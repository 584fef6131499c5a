use tracing::{debug, info, warn};

use crate::bus::{Message, Publisher};
use crate::config::RelayConfig;
use crate::store::{OutboxStore, StoreError};

/// Result of one relay pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainResult {
    /// Undispatched records read.
    pub fetched: usize,
    /// Records accepted by the transport and marked dispatched.
    pub published: usize,
    /// 1 if the pass stopped at a publish failure.
    pub failed: usize,
}

impl DrainResult {
    pub fn stopped_on_failure(&self) -> bool {
        self.failed > 0
    }
}

/// Moves committed outbox records of one transport onto that transport.
///
/// Records are published strictly in creation order. The first publish
/// failure ends the pass, so later records of the transport wait behind it.
/// A record is marked dispatched only after the transport accepted it; a crash
/// in between republishes it on restart (at-least-once). All progress lives in
/// the outbox table, so the relay itself is stateless.
pub struct OutboxRelay<S, P> {
    store: S,
    publisher: P,
    config: RelayConfig,
}

impl<S, P> OutboxRelay<S, P> {
    pub fn new(store: S, publisher: P, mut config: RelayConfig) -> Self {
        config.batch_size = config.batch_size.max(1);
        Self {
            store,
            publisher,
            config,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}

impl<S: OutboxStore, P: Publisher> OutboxRelay<S, P> {
    /// Publish up to one batch.
    pub fn run_once(&self) -> Result<DrainResult, StoreError> {
        let transport = self.config.transport.as_str();
        let records = self.store.undispatched(transport, self.config.batch_size)?;
        let mut result = DrainResult {
            fetched: records.len(),
            ..DrainResult::default()
        };

        for record in &records {
            match self.publisher.publish(Message::from(record)) {
                Ok(()) => {
                    self.store.mark_dispatched(record.id)?;
                    result.published += 1;
                    debug!(
                        transport,
                        record_id = record.id,
                        event_type = %record.event_type,
                        "outbox record dispatched"
                    );
                }
                Err(err) => {
                    warn!(
                        transport,
                        record_id = record.id,
                        event_type = %record.event_type,
                        error = %err,
                        "publish failed, stopping batch"
                    );
                    result.failed = 1;
                    break;
                }
            }
        }

        if result.published > 0 {
            info!(transport, published = result.published, "relay pass complete");
        }
        Ok(result)
    }

    /// Run passes until the outbox of this transport is empty or a publish fails.
    pub fn drain(&self) -> Result<DrainResult, StoreError> {
        let mut total = DrainResult::default();
        loop {
            let pass = self.run_once()?;
            total.fetched += pass.fetched;
            total.published += pass.published;
            total.failed += pass.failed;
            if pass.fetched == 0 || pass.stopped_on_failure() {
                return Ok(total);
            }
        }
    }
}

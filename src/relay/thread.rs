//! Background thread running an [`OutboxRelay`] until stopped.

use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info_span, warn};

use super::{Backoff, OutboxRelay};
use crate::bus::Publisher;
use crate::store::OutboxStore;

/// Statistics from the relay thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelayStats {
    pub published: usize,
    /// Passes that stopped on a publish failure.
    pub publish_failures: usize,
    /// Passes that could not read or update the outbox table.
    pub store_errors: usize,
    pub polls: usize,
}

/// A background thread that keeps one transport's outbox drained.
///
/// After a full batch it polls again immediately; after a partial batch it
/// sleeps `poll_interval`; after a failure it sleeps according to the bounded
/// exponential backoff and retries forever.
///
/// ## Example
///
/// ```ignore
/// let relay = OutboxRelay::new(store.clone(), kafka, RelayConfig::new("kafka"));
/// let worker = OutboxRelayThread::spawn(relay);
///
/// // ... serve requests ...
///
/// let stats = worker.stop();
/// println!("published {}", stats.published);
/// ```
pub struct OutboxRelayThread {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<RelayStats>>,
}

impl OutboxRelayThread {
    pub fn spawn<S, P>(relay: OutboxRelay<S, P>) -> Self
    where
        S: OutboxStore + 'static,
        P: Publisher + 'static,
    {
        let (stop_tx, stop_rx) = channel();

        let handle = thread::spawn(move || {
            let config = relay.config().clone();
            let span = info_span!("outbox_relay", transport = %config.transport);
            let _entered = span.enter();

            let mut stats = RelayStats::default();
            let mut backoff = Backoff::new(config.backoff.clone());

            loop {
                stats.polls += 1;

                let delay = match relay.run_once() {
                    Ok(pass) => {
                        stats.published += pass.published;
                        if pass.stopped_on_failure() {
                            stats.publish_failures += 1;
                            backoff.next_delay()
                        } else {
                            backoff.reset();
                            if pass.fetched >= config.batch_size {
                                Duration::ZERO
                            } else {
                                config.poll_interval
                            }
                        }
                    }
                    Err(err) => {
                        stats.store_errors += 1;
                        let delay = backoff.next_delay();
                        warn!(error = %err, attempt = backoff.attempt(), "outbox read failed");
                        delay
                    }
                };

                match stop_rx.recv_timeout(delay) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }

            stats
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the relay to stop and wait for it to finish the current pass.
    pub fn stop(mut self) -> RelayStats {
        let _ = self.stop_tx.send(());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => RelayStats::default(),
        }
    }

    /// Signal the relay to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for OutboxRelayThread {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}

//! Background thread feeding one subscriber into an [`EventConsumer`].

use std::sync::mpsc::{channel, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use tracing::{info_span, warn};

use super::{Consumed, EventConsumer};
use crate::bus::Subscriber;
use crate::config::ConsumerConfig;
use crate::context::Context;

/// Statistics from the consumer thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConsumerStats {
    pub handled: usize,
    pub ignored: usize,
    pub failed: usize,
    pub polls: usize,
}

/// Polls a subscriber, hands each delivery to the consumer, then acks
/// (handled or ignored) or nacks (failed). Redelivery and dead-lettering are
/// up to the transport.
///
/// Stopping cancels the context of the delivery in flight, which rolls its
/// unit of work back; the transport redelivers it later.
pub struct EventConsumerThread {
    stop_tx: Sender<()>,
    root: Context,
    handle: Option<JoinHandle<ConsumerStats>>,
}

impl EventConsumerThread {
    pub fn spawn<S>(consumer: EventConsumer, subscriber: S, config: ConsumerConfig) -> Self
    where
        S: Subscriber + 'static,
    {
        let (stop_tx, stop_rx) = channel();
        let root = Context::background();
        let ctx = root.clone();

        let handle = thread::spawn(move || {
            let span = info_span!("event_consumer", consumer = consumer.name(), queue = %config.queue);
            let _entered = span.enter();
            let poll_ms = u64::try_from(config.poll_interval.as_millis()).unwrap_or(u64::MAX);
            let mut stats = ConsumerStats::default();

            loop {
                match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                stats.polls += 1;

                let delivery = match subscriber.poll(poll_ms) {
                    Ok(Some(delivery)) => delivery,
                    Ok(None) => continue,
                    Err(err) => {
                        warn!(error = %err, "poll failed");
                        thread::sleep(config.poll_interval);
                        continue;
                    }
                };

                let outcome = consumer.handle(&ctx.child(), &delivery);
                let settled = match outcome {
                    Ok(Consumed::Handled) => {
                        stats.handled += 1;
                        subscriber.ack(&delivery.id)
                    }
                    Ok(Consumed::Ignored) => {
                        stats.ignored += 1;
                        subscriber.ack(&delivery.id)
                    }
                    Err(err) => {
                        stats.failed += 1;
                        warn!(
                            message_id = %delivery.id,
                            event_type = %delivery.event_type,
                            retryable = err.is_retryable(),
                            error = %err,
                            "delivery failed"
                        );
                        subscriber.nack(&delivery.id, &err.to_string())
                    }
                };
                if let Err(err) = settled {
                    warn!(message_id = %delivery.id, error = %err, "could not settle delivery");
                }
            }

            stats
        });

        Self {
            stop_tx,
            root,
            handle: Some(handle),
        }
    }

    /// Stop polling, cancel the delivery in flight and wait for the thread.
    pub fn stop(mut self) -> ConsumerStats {
        let _ = self.stop_tx.send(());
        self.root.cancel();
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => ConsumerStats::default(),
        }
    }

    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for EventConsumerThread {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}

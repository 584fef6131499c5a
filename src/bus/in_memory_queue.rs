//! In-memory queue for tests and single-process deployments.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

use super::{Delivery, Message, PublishError, Publisher, Subscriber};

/// Deliveries a message gets before it is moved to the dead-letter list.
pub const DEFAULT_MAX_DELIVERIES: u32 = 3;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Thread-safe in-memory transport implementing both [`Publisher`] and
/// [`Subscriber`].
///
/// - Messages are appended to a shared log; each subscriber keeps its own
///   read position (see [`new_subscriber`](Self::new_subscriber)).
/// - `nack` puts the message back at the front of that subscriber's queue
///   until it has failed `max_deliveries` times, after which it is parked in
///   the dead-letter list.
///
/// ```
/// use transactional_outbox::bus::{InMemoryQueue, Message, Publisher, Subscriber};
///
/// let queue = InMemoryQueue::new();
/// queue.publish(Message::with_string_payload("m-1", "order_created", "{}")).unwrap();
///
/// let delivery = queue.poll(10).unwrap().unwrap();
/// queue.nack(&delivery.id, "database down").unwrap();
///
/// // Redelivered.
/// assert_eq!(queue.poll(10).unwrap().unwrap().id, "m-1");
/// ```
#[derive(Clone)]
pub struct InMemoryQueue {
    log: Arc<RwLock<Vec<Message>>>,
    position: Arc<Mutex<usize>>,
    redeliver: Arc<Mutex<VecDeque<Message>>>,
    failures: Arc<Mutex<HashMap<String, u32>>>,
    acked: Arc<Mutex<Vec<String>>>,
    dead_letters: Arc<Mutex<Vec<(Message, String)>>>,
    max_deliveries: u32,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self {
            log: Arc::new(RwLock::new(Vec::new())),
            position: Arc::new(Mutex::new(0)),
            redeliver: Arc::new(Mutex::new(VecDeque::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            acked: Arc::new(Mutex::new(Vec::new())),
            dead_letters: Arc::new(Mutex::new(Vec::new())),
            max_deliveries: DEFAULT_MAX_DELIVERIES,
        }
    }

    pub fn with_max_deliveries(mut self, max_deliveries: u32) -> Self {
        self.max_deliveries = max_deliveries.max(1);
        self
    }

    /// A subscriber sharing the same log with its own position, redelivery
    /// queue and acknowledgements.
    pub fn new_subscriber(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            position: Arc::new(Mutex::new(0)),
            redeliver: Arc::new(Mutex::new(VecDeque::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            acked: Arc::new(Mutex::new(Vec::new())),
            dead_letters: Arc::new(Mutex::new(Vec::new())),
            max_deliveries: self.max_deliveries,
        }
    }

    /// Every message ever published, in publish order.
    pub fn messages(&self) -> Vec<Message> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.messages().into_iter().map(|m| m.event_type).collect()
    }

    pub fn find_all_by_type(&self, event_type: &str) -> Vec<Message> {
        self.messages()
            .into_iter()
            .filter(|m| m.event_type == event_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.log.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn acknowledged(&self) -> Vec<String> {
        locked(&self.acked).clone()
    }

    /// Messages that exhausted their deliveries, with the last nack reason.
    pub fn dead_letters(&self) -> Vec<(Message, String)> {
        locked(&self.dead_letters).clone()
    }

    /// Nothing waiting for this subscriber.
    pub fn is_drained(&self) -> bool {
        // The log is always locked before the position.
        let len = self.len();
        locked(&self.redeliver).is_empty() && *locked(&self.position) >= len
    }

    /// Rewind this subscriber to the start of the log, e.g. to simulate a
    /// consumer replaying everything after a crash.
    pub fn reset_position(&self) {
        *locked(&self.position) = 0;
    }

    fn next(&self) -> Option<Message> {
        if let Some(message) = locked(&self.redeliver).pop_front() {
            return Some(message);
        }
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        let mut position = locked(&self.position);
        let message = log.get(*position).cloned()?;
        *position += 1;
        Some(message)
    }
}

impl Publisher for InMemoryQueue {
    fn publish(&self, message: Message) -> Result<(), PublishError> {
        self.log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        Ok(())
    }
}

impl Subscriber for InMemoryQueue {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Delivery>, PublishError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if let Some(message) = self.next() {
                return Ok(Some(message));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn ack(&self, message_id: &str) -> Result<(), PublishError> {
        locked(&self.failures).remove(message_id);
        locked(&self.acked).push(message_id.to_string());
        Ok(())
    }

    fn nack(&self, message_id: &str, reason: &str) -> Result<(), PublishError> {
        let message = self
            .log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|m| m.id == message_id)
            .cloned()
            .ok_or_else(|| PublishError::UnknownMessage(message_id.to_string()))?;

        let failures = {
            let mut failures = locked(&self.failures);
            let count = failures.entry(message_id.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if failures >= self.max_deliveries {
            warn!(message_id, reason, failures, "message moved to dead letters");
            locked(&self.failures).remove(message_id);
            locked(&self.dead_letters).push((message, reason.to_string()));
        } else {
            locked(&self.redeliver).push_back(message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: &str, event_type: &str) -> Message {
        Message::with_string_payload(id, event_type, "{}")
    }

    #[test]
    fn publish_and_poll() {
        let queue = InMemoryQueue::new();
        queue
            .publish(Message::with_string_payload("m-1", "order_created", r#"{"id":1}"#))
            .unwrap();

        let delivery = queue.poll(100).unwrap().unwrap();
        assert_eq!(delivery.event_type, "order_created");
        assert_eq!(delivery.payload_str(), Some(r#"{"id":1}"#));
    }

    #[test]
    fn poll_times_out_when_empty() {
        let queue = InMemoryQueue::new();
        assert!(queue.poll(5).unwrap().is_none());
        assert!(queue.is_drained());
    }

    #[test]
    fn subscribers_have_independent_positions() {
        let queue = InMemoryQueue::new();
        queue.publish(message("m-1", "a")).unwrap();
        queue.publish(message("m-2", "b")).unwrap();
        let other = queue.new_subscriber();

        assert_eq!(queue.poll(5).unwrap().unwrap().id, "m-1");
        assert_eq!(queue.poll(5).unwrap().unwrap().id, "m-2");
        assert_eq!(other.poll(5).unwrap().unwrap().id, "m-1");
        assert_eq!(queue.event_types(), vec!["a", "b"]);
    }

    #[test]
    fn nack_redelivers_before_new_messages() {
        let queue = InMemoryQueue::new();
        queue.publish(message("m-1", "a")).unwrap();
        queue.publish(message("m-2", "b")).unwrap();

        let first = queue.poll(5).unwrap().unwrap();
        queue.nack(&first.id, "try again").unwrap();

        assert_eq!(queue.poll(5).unwrap().unwrap().id, "m-1");
        assert_eq!(queue.poll(5).unwrap().unwrap().id, "m-2");
    }

    #[test]
    fn repeated_nacks_dead_letter_the_message() {
        let queue = InMemoryQueue::new().with_max_deliveries(2);
        queue.publish(message("m-1", "a")).unwrap();

        let delivery = queue.poll(5).unwrap().unwrap();
        queue.nack(&delivery.id, "boom").unwrap();
        let delivery = queue.poll(5).unwrap().unwrap();
        queue.nack(&delivery.id, "boom again").unwrap();

        assert!(queue.poll(5).unwrap().is_none());
        let dead = queue.dead_letters();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].0.id, "m-1");
        assert_eq!(dead[0].1, "boom again");
    }

    #[test]
    fn ack_is_recorded() {
        let queue = InMemoryQueue::new();
        queue.publish(message("m-1", "a")).unwrap();
        let delivery = queue.poll(5).unwrap().unwrap();
        queue.ack(&delivery.id).unwrap();
        assert_eq!(queue.acknowledged(), vec!["m-1"]);
    }

    #[test]
    fn nack_of_unknown_message_fails() {
        let queue = InMemoryQueue::new();
        assert_eq!(
            queue.nack("nope", "x"),
            Err(PublishError::UnknownMessage("nope".into()))
        );
    }

    #[test]
    fn concurrent_publish_poll_and_drain_checks_make_progress() {
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        use std::sync::mpsc::channel;
        use std::thread;

        let queue = InMemoryQueue::new();
        let stop = Arc::new(AtomicBool::new(false));
        let ops = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = channel();

        let mut handles = Vec::new();
        for worker in 0..6 {
            let queue = queue.clone();
            let stop = Arc::clone(&stop);
            let ops = Arc::clone(&ops);
            let done_tx = done_tx.clone();
            handles.push(thread::spawn(move || {
                let mut n = 0;
                while !stop.load(Ordering::SeqCst) {
                    match worker % 3 {
                        0 => {
                            queue
                                .publish(message(&format!("m-{worker}-{n}"), "a"))
                                .unwrap();
                        }
                        1 => {
                            let _ = queue.poll(0).unwrap();
                        }
                        _ => {
                            let _ = queue.is_drained();
                        }
                    }
                    n += 1;
                    ops.fetch_add(1, Ordering::SeqCst);
                }
                done_tx.send(()).unwrap();
            }));
        }
        drop(done_tx);

        thread::sleep(Duration::from_millis(300));
        stop.store(true, Ordering::SeqCst);
        for _ in 0..6 {
            done_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("queue operations stalled");
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(ops.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn reset_position_replays_the_log() {
        let queue = InMemoryQueue::new();
        queue.publish(message("m-1", "a")).unwrap();
        queue.poll(5).unwrap();
        queue.reset_position();
        assert_eq!(queue.poll(5).unwrap().unwrap().id, "m-1");
    }
}

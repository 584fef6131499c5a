//! Shared wiring for the integration suites.
//!
//! Every service gets its own store, lock manager and outbox, the way they
//! would in separate processes. They only meet on the queue.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use transactional_outbox::bus::{InMemoryQueue, Message, PublishError, Publisher};
use transactional_outbox::lock::InMemoryLockManager;
use transactional_outbox::outbox::{EventDispatcher, EventSchemas};
use transactional_outbox::outbox::OutboxRecord;
use transactional_outbox::store::{InMemoryStore, OutboxStore, StoreError};
use transactional_outbox::{
    BackoffConfig, ConsumerConfig, Context, LockableUnitOfWork, OutboxRelay, RelayConfig,
    UnitOfWork,
};

/// Publisher that refuses the next `failures` messages, then forwards to a queue.
#[derive(Clone)]
pub struct FlakyPublisher {
    inner: InMemoryQueue,
    failures_left: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
}

impl FlakyPublisher {
    pub fn new(inner: InMemoryQueue, failures: usize) -> Self {
        Self {
            inner,
            failures_left: Arc::new(AtomicUsize::new(failures)),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fail_next(&self, failures: usize) {
        self.failures_left.store(failures, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Publisher for FlakyPublisher {
    fn publish(&self, message: Message) -> Result<(), PublishError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let refused = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if refused {
            return Err(PublishError::ConnectionFailed("broker unavailable".into()));
        }
        self.inner.publish(message)
    }
}

/// Outbox access that loses the next `failures` dispatch marks, as if the
/// relay crashed right after the transport accepted the message.
#[derive(Clone)]
pub struct ForgetfulOutbox {
    inner: InMemoryStore,
    failures_left: Arc<AtomicUsize>,
}

impl ForgetfulOutbox {
    pub fn new(inner: InMemoryStore, failures: usize) -> Self {
        Self {
            inner,
            failures_left: Arc::new(AtomicUsize::new(failures)),
        }
    }
}

impl OutboxStore for ForgetfulOutbox {
    fn undispatched(&self, transport: &str, limit: usize) -> Result<Vec<OutboxRecord>, StoreError> {
        self.inner.undispatched(transport, limit)
    }

    fn mark_dispatched(&self, id: u64) -> Result<(), StoreError> {
        let lost = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if lost {
            return Err(StoreError::CommitFailed(format!("mark record {id}")));
        }
        self.inner.mark_dispatched(id)
    }
}

/// One service's private infrastructure.
#[derive(Clone)]
pub struct Node {
    pub store: InMemoryStore,
    pub locks: Arc<InMemoryLockManager>,
    pub luow: LockableUnitOfWork,
}

impl Node {
    pub fn new(app_id: &str, schemas: EventSchemas) -> Self {
        let store = InMemoryStore::new();
        let locks = Arc::new(InMemoryLockManager::new());
        let uow = UnitOfWork::new(
            store.clone(),
            EventDispatcher::new(app_id, "default", schemas),
        );
        let luow = LockableUnitOfWork::new(uow, locks.clone());
        Self { store, locks, luow }
    }

    pub fn uow(&self) -> UnitOfWork {
        self.luow.unit_of_work().clone()
    }

    /// Integration names of everything this service has committed to its outbox.
    pub fn outbox_types(&self) -> Vec<String> {
        self.store
            .outbox_records()
            .unwrap()
            .into_iter()
            .map(|r| r.event_type)
            .collect()
    }

    pub fn undispatched(&self) -> usize {
        self.store
            .outbox_records()
            .unwrap()
            .iter()
            .filter(|r| !r.is_dispatched())
            .count()
    }

    pub fn relay<P: Publisher>(&self, publisher: P) -> OutboxRelay<InMemoryStore, P> {
        OutboxRelay::new(self.store.clone(), publisher, fast_relay_config())
    }
}

pub fn fast_relay_config() -> RelayConfig {
    RelayConfig::default()
        .with_poll_interval(Duration::from_millis(5))
        .with_backoff(
            BackoffConfig::default()
                .with_initial(Duration::from_millis(1))
                .with_max(Duration::from_millis(10)),
        )
}

pub fn consumer_config(queue: &str) -> ConsumerConfig {
    ConsumerConfig::new(queue).with_poll_interval(Duration::from_millis(5))
}

pub fn ctx() -> Context {
    Context::background()
}

/// Poll `check` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    check()
}

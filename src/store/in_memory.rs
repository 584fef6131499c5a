use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::SystemTime;

use tracing::debug;

use super::{Database, OutboxStore, StoreError, Transaction};
use crate::outbox::{OutboxRecord, PendingRecord};

#[derive(Clone, Debug)]
struct Row {
    version: u64,
    bytes: Vec<u8>,
}

type Tables = HashMap<String, BTreeMap<String, Row>>;

fn version_of(tables: &Tables, table: &str, key: &str) -> u64 {
    tables
        .get(table)
        .and_then(|rows| rows.get(key))
        .map_or(0, |row| row.version)
}

struct Shared {
    committed: RwLock<Arc<Tables>>,
    outbox: RwLock<Vec<OutboxRecord>>,
    outbox_seq: AtomicU64,
    failing_commits: AtomicUsize,
}

/// In-memory database with snapshot isolation and an outbox table.
///
/// Cloning creates another handle to the same storage. Each transaction reads
/// from the snapshot current at `begin`; commit applies row writes and outbox
/// appends under one write lock, so observers see all of them or none.
/// A transaction that writes a row which changed since its snapshot fails
/// with [`StoreError::ConcurrentWrite`] (first committer wins).
#[derive(Clone)]
pub struct InMemoryStore {
    shared: Arc<Shared>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore {
            shared: Arc::new(Shared {
                committed: RwLock::new(Arc::new(Tables::new())),
                outbox: RwLock::new(Vec::new()),
                outbox_seq: AtomicU64::new(1),
                failing_commits: AtomicUsize::new(0),
            }),
        }
    }

    /// Every outbox record, dispatched or not, in creation order.
    pub fn outbox_records(&self) -> Result<Vec<OutboxRecord>, StoreError> {
        let outbox = self
            .shared
            .outbox
            .read()
            .map_err(|_| StoreError::LockPoisoned("outbox read"))?;
        Ok(outbox.clone())
    }

    /// Number of committed rows in `table`, including soft-deleted ones.
    pub fn row_count(&self, table: &str) -> Result<usize, StoreError> {
        let committed = self
            .shared
            .committed
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(committed.get(table).map_or(0, BTreeMap::len))
    }

    /// Make the next `count` commits fail with [`StoreError::CommitFailed`]
    /// without applying anything. Used to exercise rollback paths.
    pub fn fail_next_commits(&self, count: usize) {
        self.shared.failing_commits.store(count, Ordering::SeqCst);
    }

    fn take_injected_failure(&self) -> bool {
        self.shared
            .failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Database for InMemoryStore {
    fn begin(&self) -> Result<Box<dyn Transaction>, StoreError> {
        let snapshot = {
            let committed = self
                .shared
                .committed
                .read()
                .map_err(|_| StoreError::LockPoisoned("begin"))?;
            Arc::clone(&committed)
        };
        Ok(Box::new(InMemoryTransaction {
            store: self.clone(),
            snapshot,
            staged: Mutex::new(Staged::default()),
        }))
    }
}

impl OutboxStore for InMemoryStore {
    fn undispatched(&self, transport: &str, limit: usize) -> Result<Vec<OutboxRecord>, StoreError> {
        let outbox = self
            .shared
            .outbox
            .read()
            .map_err(|_| StoreError::LockPoisoned("outbox read"))?;
        Ok(outbox
            .iter()
            .filter(|r| r.transport == transport && !r.is_dispatched())
            .take(limit)
            .cloned()
            .collect())
    }

    fn mark_dispatched(&self, id: u64) -> Result<(), StoreError> {
        let mut outbox = self
            .shared
            .outbox
            .write()
            .map_err(|_| StoreError::LockPoisoned("outbox write"))?;
        let record = outbox
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::RecordNotFound(id))?;
        if record.dispatched_at.is_none() {
            record.dispatched_at = Some(SystemTime::now());
        }
        Ok(())
    }
}

#[derive(Default)]
struct Staged {
    writes: HashMap<String, BTreeMap<String, Vec<u8>>>,
    outbox: Vec<PendingRecord>,
}

struct InMemoryTransaction {
    store: InMemoryStore,
    snapshot: Arc<Tables>,
    staged: Mutex<Staged>,
}

impl InMemoryTransaction {
    fn staged(&self) -> Result<std::sync::MutexGuard<'_, Staged>, StoreError> {
        self.staged
            .lock()
            .map_err(|_| StoreError::LockPoisoned("transaction"))
    }
}

impl Transaction for InMemoryTransaction {
    fn get(&self, table: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let staged = self.staged()?;
        if let Some(bytes) = staged.writes.get(table).and_then(|rows| rows.get(key)) {
            return Ok(Some(bytes.clone()));
        }
        Ok(self
            .snapshot
            .get(table)
            .and_then(|rows| rows.get(key))
            .map(|row| row.bytes.clone()))
    }

    fn scan(&self, table: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let staged = self.staged()?;
        let mut rows: BTreeMap<String, Vec<u8>> = self
            .snapshot
            .get(table)
            .map(|rows| {
                rows.iter()
                    .map(|(key, row)| (key.clone(), row.bytes.clone()))
                    .collect()
            })
            .unwrap_or_default();
        if let Some(written) = staged.writes.get(table) {
            rows.extend(written.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Ok(rows.into_iter().collect())
    }

    fn put(&self, table: &str, key: &str, row: Vec<u8>) -> Result<(), StoreError> {
        self.staged()?
            .writes
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), row);
        Ok(())
    }

    fn append_outbox(&self, record: PendingRecord) -> Result<(), StoreError> {
        self.staged()?.outbox.push(record);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTransaction {
            store,
            snapshot,
            staged,
        } = *self;
        let staged = staged
            .into_inner()
            .map_err(|_| StoreError::LockPoisoned("transaction"))?;

        if store.take_injected_failure() {
            return Err(StoreError::CommitFailed("injected failure".to_string()));
        }

        let mut committed = store
            .shared
            .committed
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        let mut outbox = store
            .shared
            .outbox
            .write()
            .map_err(|_| StoreError::LockPoisoned("outbox write"))?;

        for (table, rows) in &staged.writes {
            for key in rows.keys() {
                let expected = version_of(&snapshot, table, key);
                let actual = version_of(&committed, table, key);
                if expected != actual {
                    return Err(StoreError::ConcurrentWrite {
                        table: table.clone(),
                        key: key.clone(),
                        expected,
                        actual,
                    });
                }
            }
        }
        drop(snapshot);

        let tables = Arc::make_mut(&mut committed);
        let mut written = 0;
        for (table, rows) in staged.writes {
            let target = tables.entry(table).or_default();
            for (key, bytes) in rows {
                let version = target.get(&key).map_or(0, |row| row.version) + 1;
                target.insert(key, Row { version, bytes });
                written += 1;
            }
        }
        let appended = staged.outbox.len();
        for pending in staged.outbox {
            let id = store.shared.outbox_seq.fetch_add(1, Ordering::SeqCst);
            outbox.push(pending.into_record(id));
        }

        debug!(rows = written, outbox = appended, "transaction committed");
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        debug!("transaction rolled back");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(event_type: &str, transport: &str) -> PendingRecord {
        PendingRecord {
            app_id: "test".into(),
            transport: transport.into(),
            event_type: event_type.into(),
            payload: "{}".into(),
            created_at: SystemTime::now(),
        }
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    #[test]
    fn writes_are_invisible_until_commit() {
        let store = InMemoryStore::new();
        let tx = store.begin().unwrap();
        tx.put("orders", "1", vec![1]).unwrap();
        tx.append_outbox(pending("order_created", "kafka")).unwrap();

        assert_eq!(tx.get("orders", "1").unwrap(), Some(vec![1]));
        assert_eq!(store.row_count("orders").unwrap(), 0);
        assert!(store.outbox_records().unwrap().is_empty());

        tx.commit().unwrap();

        assert_eq!(store.row_count("orders").unwrap(), 1);
        assert_eq!(store.outbox_records().unwrap().len(), 1);
    }

    #[test]
    fn rollback_discards_everything() {
        let store = InMemoryStore::new();
        let tx = store.begin().unwrap();
        tx.put("orders", "1", vec![1]).unwrap();
        tx.append_outbox(pending("order_created", "kafka")).unwrap();
        tx.rollback();

        assert_eq!(store.row_count("orders").unwrap(), 0);
        assert!(store.outbox_records().unwrap().is_empty());
    }

    #[test]
    fn dropping_a_transaction_rolls_back() {
        let store = InMemoryStore::new();
        {
            let tx = store.begin().unwrap();
            tx.put("orders", "1", vec![1]).unwrap();
        }
        assert_eq!(store.row_count("orders").unwrap(), 0);
    }

    #[test]
    fn reads_come_from_the_begin_snapshot() {
        let store = InMemoryStore::new();
        let reader = store.begin().unwrap();

        let writer = store.begin().unwrap();
        writer.put("orders", "1", vec![1]).unwrap();
        writer.commit().unwrap();

        assert_eq!(reader.get("orders", "1").unwrap(), None);
        assert_eq!(store.begin().unwrap().get("orders", "1").unwrap(), Some(vec![1]));
    }

    #[test]
    fn scan_merges_own_writes_in_key_order() {
        let store = InMemoryStore::new();
        let seed = store.begin().unwrap();
        seed.put("orders", "b", vec![2]).unwrap();
        seed.commit().unwrap();

        let tx = store.begin().unwrap();
        tx.put("orders", "a", vec![1]).unwrap();
        tx.put("orders", "b", vec![20]).unwrap();

        let rows = tx.scan("orders").unwrap();
        assert_eq!(
            rows,
            vec![("a".to_string(), vec![1]), ("b".to_string(), vec![20])]
        );
    }

    #[test]
    fn first_committer_wins() {
        let store = InMemoryStore::new();
        let first = store.begin().unwrap();
        let second = store.begin().unwrap();

        first.put("balances", "c1", vec![1]).unwrap();
        second.put("balances", "c1", vec![2]).unwrap();
        second.append_outbox(pending("balance_changed", "kafka")).unwrap();

        first.commit().unwrap();
        let err = second.commit().unwrap_err();

        assert_eq!(
            err,
            StoreError::ConcurrentWrite {
                table: "balances".into(),
                key: "c1".into(),
                expected: 0,
                actual: 1,
            }
        );
        assert!(err.is_retryable());
        assert_eq!(store.begin().unwrap().get("balances", "c1").unwrap(), Some(vec![1]));
        assert!(store.outbox_records().unwrap().is_empty());
    }

    #[test]
    fn injected_commit_failure_applies_nothing() {
        let store = InMemoryStore::new();
        store.fail_next_commits(1);

        let tx = store.begin().unwrap();
        tx.put("orders", "1", vec![1]).unwrap();
        assert!(matches!(tx.commit(), Err(StoreError::CommitFailed(_))));
        assert_eq!(store.row_count("orders").unwrap(), 0);

        let tx = store.begin().unwrap();
        tx.put("orders", "1", vec![1]).unwrap();
        tx.commit().unwrap();
        assert_eq!(store.row_count("orders").unwrap(), 1);
    }

    // ========================================================================
    // Outbox table
    // ========================================================================

    #[test]
    fn outbox_ids_follow_commit_order() {
        let store = InMemoryStore::new();
        for event_type in ["a", "b", "c"] {
            let tx = store.begin().unwrap();
            tx.append_outbox(pending(event_type, "kafka")).unwrap();
            tx.commit().unwrap();
        }

        let records = store.undispatched("kafka", 10).unwrap();
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(records[0].event_type, "a");
    }

    #[test]
    fn undispatched_filters_by_transport_and_limit() {
        let store = InMemoryStore::new();
        let tx = store.begin().unwrap();
        tx.append_outbox(pending("a", "kafka")).unwrap();
        tx.append_outbox(pending("b", "nats")).unwrap();
        tx.append_outbox(pending("c", "kafka")).unwrap();
        tx.commit().unwrap();

        assert_eq!(store.undispatched("kafka", 10).unwrap().len(), 2);
        assert_eq!(store.undispatched("kafka", 1).unwrap().len(), 1);
        assert_eq!(store.undispatched("nats", 10).unwrap()[0].event_type, "b");
    }

    #[test]
    fn mark_dispatched_is_idempotent() {
        let store = InMemoryStore::new();
        let tx = store.begin().unwrap();
        tx.append_outbox(pending("a", "kafka")).unwrap();
        tx.commit().unwrap();

        store.mark_dispatched(1).unwrap();
        let first = store.outbox_records().unwrap()[0].dispatched_at;
        store.mark_dispatched(1).unwrap();

        assert!(first.is_some());
        assert_eq!(store.outbox_records().unwrap()[0].dispatched_at, first);
        assert!(store.undispatched("kafka", 10).unwrap().is_empty());
        assert_eq!(store.mark_dispatched(9), Err(StoreError::RecordNotFound(9)));
    }
}

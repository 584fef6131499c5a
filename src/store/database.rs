use std::sync::Arc;

use super::StoreError;
use crate::outbox::{OutboxRecord, PendingRecord};

/// Something that can open local transactions.
pub trait Database: Send + Sync {
    fn begin(&self) -> Result<Box<dyn Transaction>, StoreError>;
}

impl<D: Database + ?Sized> Database for Arc<D> {
    fn begin(&self) -> Result<Box<dyn Transaction>, StoreError> {
        (**self).begin()
    }
}

/// One local ACID transaction over keyed tables plus the outbox table.
///
/// Reads see a single snapshot plus this transaction's own writes. Nothing is
/// visible to anyone else until [`commit`](Transaction::commit). Dropping a
/// transaction without committing rolls it back.
pub trait Transaction: Send + Sync {
    fn get(&self, table: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// All rows of `table` ordered by key.
    fn scan(&self, table: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    fn put(&self, table: &str, key: &str, row: Vec<u8>) -> Result<(), StoreError>;

    fn append_outbox(&self, record: PendingRecord) -> Result<(), StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    fn rollback(self: Box<Self>);
}

/// Relay-side access to the outbox table.
pub trait OutboxStore: Send + Sync {
    /// Undispatched records of `transport`, oldest first.
    fn undispatched(&self, transport: &str, limit: usize) -> Result<Vec<OutboxRecord>, StoreError>;

    /// Stamp `dispatched_at`. Marking an already dispatched record is a no-op.
    fn mark_dispatched(&self, id: u64) -> Result<(), StoreError>;
}

impl<S: OutboxStore + ?Sized> OutboxStore for Arc<S> {
    fn undispatched(&self, transport: &str, limit: usize) -> Result<Vec<OutboxRecord>, StoreError> {
        (**self).undispatched(transport, limit)
    }

    fn mark_dispatched(&self, id: u64) -> Result<(), StoreError> {
        (**self).mark_dispatched(id)
    }
}

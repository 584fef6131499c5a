use std::marker::PhantomData;
use std::time::SystemTime;

use uuid::Uuid;

use crate::context::Context;
use crate::domain::{Aggregate, DomainError};
use crate::error::Result;
use crate::store::{StoreError, Transaction};

/// Typed access to one aggregate table inside a unit of work.
///
/// Rows are bitcode-encoded aggregates keyed by id. This is the only place
/// that knows about soft deletion: `find`, `find_by` and `list` never return
/// a deleted aggregate, and "not found" means "absent or deleted".
pub struct Repository<'tx, A> {
    tx: &'tx dyn Transaction,
    ctx: &'tx Context,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A> Clone for Repository<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for Repository<'_, A> {}

impl<'tx, A: Aggregate> Repository<'tx, A> {
    pub(crate) fn new(tx: &'tx dyn Transaction, ctx: &'tx Context) -> Self {
        Self {
            tx,
            ctx,
            _aggregate: PhantomData,
        }
    }

    pub fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }

    /// Insert or replace the aggregate's row.
    pub fn store(&self, aggregate: &A) -> Result<()> {
        self.ctx.check()?;
        let key = aggregate.id().to_string();
        let row = bitcode::serialize(aggregate).map_err(|e| StoreError::Encode {
            table: A::KIND.to_string(),
            key: key.clone(),
            reason: e.to_string(),
        })?;
        self.tx.put(A::KIND, &key, row)?;
        Ok(())
    }

    /// The stored row, deleted or not.
    pub fn load(&self, id: Uuid) -> Result<Option<A>> {
        self.ctx.check()?;
        let key = id.to_string();
        match self.tx.get(A::KIND, &key)? {
            Some(row) => Ok(Some(decode(&key, &row)?)),
            None => Ok(None),
        }
    }

    pub fn find(&self, id: Uuid) -> Result<A> {
        match self.load(id)? {
            Some(aggregate) if !aggregate.is_deleted() => Ok(aggregate),
            _ => Err(DomainError::not_found(A::KIND, id).into()),
        }
    }

    pub fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.load(id)?.is_some_and(|a| !a.is_deleted()))
    }

    /// The first active aggregate (in id order) matching `predicate`.
    pub fn find_by(&self, predicate: impl Fn(&A) -> bool) -> Result<A> {
        self.list()?
            .into_iter()
            .find(|a| predicate(a))
            .ok_or_else(|| DomainError::not_found(A::KIND, "matching query").into())
    }

    pub fn find_all_by(&self, predicate: impl Fn(&A) -> bool) -> Result<Vec<A>> {
        Ok(self.list()?.into_iter().filter(|a| predicate(a)).collect())
    }

    /// Every active aggregate, in id order.
    pub fn list(&self) -> Result<Vec<A>> {
        self.ctx.check()?;
        let mut aggregates = Vec::new();
        for (key, row) in self.tx.scan(A::KIND)? {
            let aggregate: A = decode(&key, &row)?;
            if !aggregate.is_deleted() {
                aggregates.push(aggregate);
            }
        }
        Ok(aggregates)
    }

    /// Soft delete. Returns the aggregate as stored after deletion.
    pub fn delete(&self, id: Uuid) -> Result<A> {
        let mut aggregate = self.find(id)?;
        aggregate.audit_mut().mark_deleted(SystemTime::now());
        self.store(&aggregate)?;
        Ok(aggregate)
    }
}

fn decode<A: Aggregate>(key: &str, row: &[u8]) -> Result<A, StoreError> {
    bitcode::deserialize(row).map_err(|e| StoreError::Decode {
        table: A::KIND.to_string(),
        key: key.to_string(),
        reason: e.to_string(),
    })
}

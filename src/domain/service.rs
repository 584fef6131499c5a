use std::time::SystemTime;

use uuid::Uuid;

use super::{Aggregate, DomainError};
use crate::error::Result;
use crate::uow::Repository;

/// Rules an aggregate must satisfy after every change.
///
/// Any `Fn(&A) -> Result<(), DomainError>` closure is an `Invariants<A>`.
pub trait Invariants<A>: Send + Sync {
    fn check(&self, aggregate: &A) -> Result<(), DomainError>;
}

/// No rules beyond what the operations themselves check.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInvariants;

impl<A> Invariants<A> for NoInvariants {
    fn check(&self, _aggregate: &A) -> Result<(), DomainError> {
        Ok(())
    }
}

impl<A, F> Invariants<A> for F
where
    F: Fn(&A) -> Result<(), DomainError> + Send + Sync,
{
    fn check(&self, aggregate: &A) -> Result<(), DomainError> {
        self(aggregate)
    }
}

/// The state of an aggregate before and after an update.
#[derive(Debug, Clone)]
pub struct Change<A> {
    pub before: A,
    pub after: A,
}

/// Create/update/delete plumbing shared by every aggregate.
///
/// Changes are computed on a copy, validated against the invariants and
/// stored once; a rejected change leaves the stored aggregate untouched.
/// Event construction stays with the per-domain services, which know what
/// changed.
pub struct DomainService<'tx, A, I = NoInvariants> {
    repo: Repository<'tx, A>,
    invariants: I,
}

impl<'tx, A: Aggregate> DomainService<'tx, A, NoInvariants> {
    pub fn new(repo: Repository<'tx, A>) -> Self {
        Self {
            repo,
            invariants: NoInvariants,
        }
    }
}

impl<'tx, A: Aggregate, I: Invariants<A>> DomainService<'tx, A, I> {
    pub fn with_invariants(repo: Repository<'tx, A>, invariants: I) -> Self {
        Self { repo, invariants }
    }

    pub fn repository(&self) -> &Repository<'tx, A> {
        &self.repo
    }

    pub fn find(&self, id: Uuid) -> Result<A> {
        self.repo.find(id)
    }

    /// Build a new aggregate from a fresh id and the current time, then store it.
    pub fn create(&self, build: impl FnOnce(Uuid, SystemTime) -> A) -> Result<A> {
        let aggregate = build(self.repo.next_id(), SystemTime::now());
        self.invariants.check(&aggregate)?;
        self.repo.store(&aggregate)?;
        Ok(aggregate)
    }

    /// Apply `change` to the active aggregate `id`.
    pub fn update(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut A) -> Result<(), DomainError>,
    ) -> Result<Change<A>> {
        let before = self.repo.find(id)?;
        let mut after = before.clone();
        change(&mut after)?;
        self.invariants.check(&after)?;
        after.audit_mut().touch(SystemTime::now());
        self.repo.store(&after)?;
        Ok(Change { before, after })
    }

    /// Create the aggregate if `id` is absent (or deleted), otherwise update it.
    pub fn upsert(
        &self,
        id: Uuid,
        build: impl FnOnce(SystemTime) -> A,
        change: impl FnOnce(&mut A),
    ) -> Result<A> {
        let now = SystemTime::now();
        let aggregate = match self.repo.load(id)? {
            Some(mut existing) if !existing.is_deleted() => {
                change(&mut existing);
                existing.audit_mut().touch(now);
                existing
            }
            _ => build(now),
        };
        self.invariants.check(&aggregate)?;
        self.repo.store(&aggregate)?;
        Ok(aggregate)
    }

    pub fn delete(&self, id: Uuid) -> Result<A> {
        self.repo.delete(id)
    }
}

use std::fmt::Debug;
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether an aggregate is live or soft-deleted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    #[default]
    Active,
    Deleted { at: SystemTime },
}

impl Lifecycle {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Lifecycle::Deleted { .. })
    }

    pub fn deleted_at(&self) -> Option<SystemTime> {
        match self {
            Lifecycle::Deleted { at } => Some(*at),
            Lifecycle::Active => None,
        }
    }
}

/// Bookkeeping carried by every aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
    pub lifecycle: Lifecycle,
}

impl Audit {
    pub fn new(at: SystemTime) -> Self {
        Self {
            created_at: at,
            updated_at: at,
            lifecycle: Lifecycle::Active,
        }
    }

    pub fn touch(&mut self, at: SystemTime) {
        self.updated_at = at;
    }

    pub fn mark_deleted(&mut self, at: SystemTime) {
        self.updated_at = at;
        self.lifecycle = Lifecycle::Deleted { at };
    }
}

/// A consistency boundary persisted as one row.
///
/// `KIND` names both the table the repository stores it in and the entity
/// reported by "not found" errors.
pub trait Aggregate: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    const KIND: &'static str;

    fn id(&self) -> Uuid;

    fn audit(&self) -> &Audit;

    fn audit_mut(&mut self) -> &mut Audit;

    fn is_deleted(&self) -> bool {
        self.audit().lifecycle.is_deleted()
    }
}

/// Implements [`Aggregate`] for a struct with an `audit: Audit` field.
///
/// ```ignore
/// impl_aggregate!(Order, "order", id);
/// ```
#[macro_export]
macro_rules! impl_aggregate {
    ($ty:ty, $kind:literal, $id:ident) => {
        impl $crate::domain::Aggregate for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> ::uuid::Uuid {
                self.$id
            }

            fn audit(&self) -> &$crate::domain::Audit {
                &self.audit
            }

            fn audit_mut(&mut self) -> &mut $crate::domain::Audit {
                &mut self.audit
            }
        }
    };
}

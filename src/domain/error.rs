use std::fmt::Display;

use thiserror::Error;

use super::inventory::InventoryError;
use super::order::OrderError;
use super::payment::PaymentError;
use super::user::UserError;

/// A business rule rejected the request.
///
/// Domain errors are terminal: retrying the same request yields the same
/// error, and a failed operation never emits events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The aggregate is absent or soft-deleted.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl DomainError {
    pub fn not_found(kind: &'static str, id: impl Display) -> Self {
        DomainError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }
}

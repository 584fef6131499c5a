use thiserror::Error;

use crate::context::ContextError;
use crate::domain::inventory::InventoryError;
use crate::domain::order::OrderError;
use crate::domain::payment::PaymentError;
use crate::domain::user::UserError;
use crate::domain::DomainError;
use crate::lock::LockError;
use crate::outbox::SerializationError;
use crate::store::StoreError;

/// Crate-wide error returned by units of work and the services built on them.
#[derive(Debug, Error)]
pub enum Error {
    /// A business rule rejected the request. Never retried, never dispatched.
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Lock(LockError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// An event could not be turned into its integration schema.
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error("operation cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Infrastructure failures that a caller may retry as a whole.
    ///
    /// Domain and serialization errors are deterministic and are never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Lock(err) => err.is_retryable(),
            Error::Store(err) => err.is_retryable(),
            Error::DeadlineExceeded => true,
            Error::Domain(_) | Error::Serialization(_) | Error::Cancelled => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Domain(err) if err.is_not_found())
    }

    /// The domain error, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Error::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContextError> for Error {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Cancelled => Error::Cancelled,
            ContextError::DeadlineExceeded => Error::DeadlineExceeded,
        }
    }
}

// An interrupted lock wait is a context failure, not a lock failure.
impl From<LockError> for Error {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Interrupted(ctx) => ctx.into(),
            other => Error::Lock(other),
        }
    }
}

macro_rules! domain_error_into_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Error {
                fn from(err: $ty) -> Self {
                    Error::Domain(DomainError::from(err))
                }
            }
        )*
    };
}

domain_error_into_error!(PaymentError, OrderError, UserError, InventoryError);

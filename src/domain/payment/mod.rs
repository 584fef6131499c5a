//! Payment context: customer wallets and the transactions against them.

mod app;
mod events;
pub mod integration;
mod model;
mod service;

pub use app::PaymentApp;
pub use events::{CustomerAccountCreated, CustomerAmountUpdated, RefundCreated, TransactionCreated};
pub use model::{Amount, CustomerBalance, PaymentError, PaymentTransaction, TransactionKind};
pub use service::{BalanceInvariants, PaymentService};

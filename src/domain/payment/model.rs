use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Audit;
use crate::impl_aggregate;

/// Amounts are integer minor units (cents).
pub type Amount = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(Amount),
    #[error("customer {customer_id} has {available}, needs {requested}")]
    NotEnoughAmount {
        customer_id: Uuid,
        available: Amount,
        requested: Amount,
    },
    #[error("balance for customer {0} already exists")]
    BalanceExisted(Uuid),
    #[error("balance of customer {customer_id} would become {amount}")]
    NegativeBalance { customer_id: Uuid, amount: Amount },
}

/// A customer's wallet. Keyed by the customer id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerBalance {
    pub customer_id: Uuid,
    pub amount: Amount,
    pub audit: Audit,
}

impl_aggregate!(CustomerBalance, "customer_balance", customer_id);

impl CustomerBalance {
    pub fn new(customer_id: Uuid, at: SystemTime) -> Self {
        Self {
            customer_id,
            amount: 0,
            audit: Audit::new(at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Payment,
    Refund,
}

/// A debit (payment) or credit (refund) against a customer balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub payment_date: SystemTime,
    pub audit: Audit,
}

impl_aggregate!(PaymentTransaction, "payment_transaction", id);

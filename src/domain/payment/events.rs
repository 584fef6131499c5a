use std::time::SystemTime;

use uuid::Uuid;

use super::Amount;
use crate::domain::DomainEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerAccountCreated {
    pub customer_id: Uuid,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerAmountUpdated {
    pub customer_id: Uuid,
    pub previous_amount: Amount,
    pub new_amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionCreated {
    pub transaction_id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub amount: Amount,
    pub payment_date: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundCreated {
    pub transaction_id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub amount: Amount,
    pub payment_date: SystemTime,
}

impl DomainEvent for CustomerAccountCreated {
    fn event_type(&self) -> &'static str {
        "CustomerAccountCreated"
    }
}

impl DomainEvent for CustomerAmountUpdated {
    fn event_type(&self) -> &'static str {
        "CustomerAmountUpdated"
    }
}

impl DomainEvent for TransactionCreated {
    fn event_type(&self) -> &'static str {
        "TransactionCreated"
    }
}

impl DomainEvent for RefundCreated {
    fn event_type(&self) -> &'static str {
        "RefundCreated"
    }
}

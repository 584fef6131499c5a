use std::time::SystemTime;

use uuid::Uuid;

use super::Quantity;
use crate::domain::payment::Amount;
use crate::domain::DomainEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCreated {
    pub product_id: Uuid,
    pub name: String,
    pub price: Amount,
    pub quantity: Quantity,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuantityChanged {
    pub product_id: Uuid,
    pub previous_quantity: Quantity,
    pub new_quantity: Quantity,
}

/// Name or price changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdated {
    pub product_id: Uuid,
    pub name: String,
    pub price: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDeleted {
    pub product_id: Uuid,
}

impl DomainEvent for ProductCreated {
    fn event_type(&self) -> &'static str {
        "ProductCreated"
    }
}

impl DomainEvent for ProductQuantityChanged {
    fn event_type(&self) -> &'static str {
        "ProductQuantityChanged"
    }
}

impl DomainEvent for ProductUpdated {
    fn event_type(&self) -> &'static str {
        "ProductUpdated"
    }
}

impl DomainEvent for ProductDeleted {
    fn event_type(&self) -> &'static str {
        "ProductDeleted"
    }
}

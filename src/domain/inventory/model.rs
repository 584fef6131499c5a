use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::payment::Amount;
use crate::domain::Audit;
use crate::impl_aggregate;

pub type Quantity = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("quantity of product {product_id} would drop to {quantity}")]
    QuantityBelowZero { product_id: Uuid, quantity: Quantity },
    #[error("quantity change must be positive, got {0}")]
    InvalidQuantity(Quantity),
    #[error("price must not be negative, got {0}")]
    NegativePrice(Amount),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Amount,
    pub quantity: Quantity,
    pub audit: Audit,
}

impl_aggregate!(Product, "product", id);

impl Product {
    pub fn new(id: Uuid, name: &str, price: Amount, quantity: Quantity, at: SystemTime) -> Self {
        Self {
            id,
            name: name.to_string(),
            price,
            quantity,
            audit: Audit::new(at),
        }
    }
}

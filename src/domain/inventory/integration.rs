//! Inventory wire schemas.

use serde::{Deserialize, Serialize};

use super::{ProductCreated, ProductDeleted, ProductQuantityChanged, ProductUpdated, Quantity};
use crate::domain::payment::Amount;
use crate::outbox::{epoch_seconds, EventSchemas};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSchema {
    pub product_id: String,
    pub name: String,
    pub price: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreatedSchema {
    pub product_id: String,
    pub name: String,
    pub price: Amount,
    pub quantity: Quantity,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuantityChangedSchema {
    pub product_id: String,
    pub previous_quantity: Quantity,
    pub new_quantity: Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeletedSchema {
    pub product_id: String,
}

pub fn schemas() -> EventSchemas {
    EventSchemas::new()
        .register("product_created", |e: &ProductCreated| ProductCreatedSchema {
            product_id: e.product_id.to_string(),
            name: e.name.clone(),
            price: e.price,
            quantity: e.quantity,
            created_at: epoch_seconds(e.created_at),
        })
        .register("product_quantity_changed", |e: &ProductQuantityChanged| {
            ProductQuantityChangedSchema {
                product_id: e.product_id.to_string(),
                previous_quantity: e.previous_quantity,
                new_quantity: e.new_quantity,
            }
        })
        .register("product_updated", |e: &ProductUpdated| ProductSchema {
            product_id: e.product_id.to_string(),
            name: e.name.clone(),
            price: e.price,
        })
        .register("product_deleted", |e: &ProductDeleted| ProductDeletedSchema {
            product_id: e.product_id.to_string(),
        })
}

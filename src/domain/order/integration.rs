//! Order wire schemas and the local-copy sync handlers.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{
    DataSync, OrderCancelled, OrderCreated, OrderDeleted, OrderItem, OrderItemChanged, OrderPaid,
    OrderStatusChanged,
};
use crate::consumer::EventHandlers;
use crate::context::Context;
use crate::domain::payment::Amount;
use crate::error::Result;
use crate::outbox::{epoch_seconds, EventSchemas};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemSchema {
    pub item_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub price: Amount,
}

impl From<&OrderItem> for OrderItemSchema {
    fn from(item: &OrderItem) -> Self {
        Self {
            item_id: item.id.to_string(),
            product_id: item.product_id.to_string(),
            quantity: 1,
            price: item.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedSchema {
    pub order_id: String,
    pub user_id: String,
    pub total_price: Amount,
    pub items: Vec<OrderItemSchema>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemChangedSchema {
    pub order_id: String,
    pub added_items: Vec<OrderItemSchema>,
    pub removed_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedSchema {
    pub order_id: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidSchema {
    pub order_id: String,
    pub user_id: String,
    pub total_price: Amount,
    pub paid_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelledSchema {
    pub order_id: String,
    pub reason: String,
    pub cancelled_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDeletedSchema {
    pub order_id: String,
    pub deleted_at: i64,
}

pub fn schemas() -> EventSchemas {
    EventSchemas::new()
        .register("order_created", |e: &OrderCreated| OrderCreatedSchema {
            order_id: e.order_id.to_string(),
            user_id: e.customer_id.to_string(),
            total_price: e.total_price,
            items: e.items.iter().map(OrderItemSchema::from).collect(),
            created_at: epoch_seconds(e.created_at),
        })
        .register("order_item_changed", |e: &OrderItemChanged| OrderItemChangedSchema {
            order_id: e.order_id.to_string(),
            added_items: e.added.iter().map(OrderItemSchema::from).collect(),
            removed_items: e.removed.iter().map(Uuid::to_string).collect(),
        })
        .register("order_status_changed", |e: &OrderStatusChanged| OrderStatusChangedSchema {
            order_id: e.order_id.to_string(),
            from: e.from.to_string(),
            to: e.to.to_string(),
        })
        .register("order_paid", |e: &OrderPaid| OrderPaidSchema {
            order_id: e.order_id.to_string(),
            user_id: e.customer_id.to_string(),
            total_price: e.total_price,
            paid_at: epoch_seconds(e.paid_at),
        })
        .register("order_cancelled", |e: &OrderCancelled| OrderCancelledSchema {
            order_id: e.order_id.to_string(),
            reason: e.reason.clone(),
            cancelled_at: epoch_seconds(e.cancelled_at),
        })
        .register("order_deleted", |e: &OrderDeleted| OrderDeletedSchema {
            order_id: e.order_id.to_string(),
            deleted_at: epoch_seconds(e.deleted_at),
        })
}

#[derive(Debug, Deserialize)]
pub struct UserMessage {
    pub user_id: Uuid,
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductMessage {
    pub product_id: Uuid,
    pub name: String,
    pub price: Amount,
}

/// Mirrors users and products into the order service's local tables.
pub fn handlers(sync: DataSync) -> EventHandlers {
    let users = sync.clone();
    let user_handler = move |ctx: &Context, event: UserMessage| -> Result<()> {
        users.sync_user(ctx, event.user_id, &event.login)?;
        debug!(user = %event.user_id, "local user synced");
        Ok(())
    };
    let product_handler = move |ctx: &Context, event: ProductMessage| -> Result<()> {
        sync.sync_product(ctx, event.product_id, &event.name, event.price)?;
        debug!(product = %event.product_id, "local product synced");
        Ok(())
    };

    EventHandlers::new()
        .on("user_created", user_handler.clone())
        .on("user_updated", user_handler)
        .on("product_created", product_handler.clone())
        .on("product_updated", product_handler)
}

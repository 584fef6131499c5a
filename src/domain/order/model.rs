use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::payment::Amount;
use crate::domain::Audit;
use crate::impl_aggregate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Transitions the order lifecycle allows.
    pub fn can_become(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Open, Pending) | (Open, Cancelled) | (Pending, Paid) | (Pending, Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order {order_id} is {status}, items can only change while open")]
    InvalidStatus { order_id: Uuid, status: OrderStatus },
    #[error("order {order_id} is already {status}")]
    AlreadyInStatus { order_id: Uuid, status: OrderStatus },
    #[error("order {order_id} cannot go from {from} to {to}")]
    InvalidTransition {
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    },
    #[error("order {order_id} does not belong to customer {customer_id}")]
    AccessDenied { order_id: Uuid, customer_id: Uuid },
    #[error("order {order_id} has no item {item_id}")]
    ItemNotFound { order_id: Uuid, item_id: Uuid },
    #[error("order {0} has no items")]
    Empty(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub price: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub audit: Audit,
}

impl_aggregate!(Order, "order", id);

impl Order {
    pub fn new(id: Uuid, customer_id: Uuid, at: SystemTime) -> Self {
        Self {
            id,
            customer_id,
            status: OrderStatus::Open,
            items: Vec::new(),
            audit: Audit::new(at),
        }
    }

    pub fn total_price(&self) -> Amount {
        self.items.iter().map(|item| item.price).sum()
    }

    pub(crate) fn ensure_owner(&self, customer_id: Uuid) -> Result<(), OrderError> {
        if self.customer_id != customer_id {
            return Err(OrderError::AccessDenied {
                order_id: self.id,
                customer_id,
            });
        }
        Ok(())
    }

    pub(crate) fn ensure_open(&self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Open {
            return Err(OrderError::InvalidStatus {
                order_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    pub(crate) fn transition(&mut self, next: OrderStatus) -> Result<OrderStatus, OrderError> {
        let current = self.status;
        if current == next {
            return Err(OrderError::AlreadyInStatus {
                order_id: self.id,
                status: current,
            });
        }
        if !current.can_become(next) {
            return Err(OrderError::InvalidTransition {
                order_id: self.id,
                from: current,
                to: next,
            });
        }
        self.status = next;
        Ok(current)
    }
}

/// Users as known to the order service, synced from `user_*` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    pub user_id: Uuid,
    pub login: String,
    pub audit: Audit,
}

impl_aggregate!(LocalUser, "local_user", user_id);

/// Products as known to the order service, synced from `product_*` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProduct {
    pub product_id: Uuid,
    pub name: String,
    pub price: Amount,
    pub audit: Audit,
}

impl_aggregate!(LocalProduct, "local_product", product_id);

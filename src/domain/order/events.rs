use std::time::SystemTime;

use uuid::Uuid;

use super::{OrderItem, OrderStatus};
use crate::domain::payment::Amount;
use crate::domain::DomainEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCreated {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_price: Amount,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemChanged {
    pub order_id: Uuid,
    pub added: Vec<OrderItem>,
    pub removed: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusChanged {
    pub order_id: Uuid,
    pub from: OrderStatus,
    pub to: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPaid {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub total_price: Amount,
    pub paid_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCancelled {
    pub order_id: Uuid,
    pub reason: String,
    pub cancelled_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDeleted {
    pub order_id: Uuid,
    pub deleted_at: SystemTime,
}

macro_rules! domain_event {
    ($($ty:ident),* $(,)?) => {
        $(
            impl DomainEvent for $ty {
                fn event_type(&self) -> &'static str {
                    stringify!($ty)
                }
            }
        )*
    };
}

domain_event!(
    OrderCreated,
    OrderItemChanged,
    OrderStatusChanged,
    OrderPaid,
    OrderCancelled,
    OrderDeleted,
);

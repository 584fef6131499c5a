//! Order context: carts that become paid or cancelled orders, priced from a
//! local copy of the product catalogue.

mod app;
mod events;
pub mod integration;
mod model;
mod service;
mod sync;

pub use app::OrderApp;
pub use events::{
    OrderCancelled, OrderCreated, OrderDeleted, OrderItemChanged, OrderPaid, OrderStatusChanged,
};
pub use model::{LocalProduct, LocalUser, Order, OrderError, OrderItem, OrderStatus};
pub use service::{OrderInvariants, OrderService};
pub use sync::DataSync;

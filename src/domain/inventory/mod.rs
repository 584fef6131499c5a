//! Inventory context: the product catalogue and its stock.

mod app;
mod events;
pub mod integration;
mod model;
mod service;

pub use app::InventoryApp;
pub use events::{ProductCreated, ProductDeleted, ProductQuantityChanged, ProductUpdated};
pub use model::{InventoryError, Product, Quantity};
pub use service::{InventoryService, StockInvariants};

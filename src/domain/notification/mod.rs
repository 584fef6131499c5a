//! Notification context: user-facing messages derived from other services'
//! events.

mod app;
mod events;
pub mod integration;
mod model;
mod service;

pub use app::NotificationApp;
pub use events::{NotificationCreated, NotificationDeleted, NotificationSent};
pub use model::{Notification, Recipient};
pub use service::NotificationService;

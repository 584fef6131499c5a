//! User context: registration and profile changes.

mod app;
mod events;
pub mod integration;
mod model;
mod service;

pub use app::UserApp;
pub use events::{UserCreated, UserDeleted, UserUpdated};
pub use model::{User, UserError};
pub use service::{UserInvariants, UserService};

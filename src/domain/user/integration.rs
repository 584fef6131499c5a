//! User wire schemas.

use serde::{Deserialize, Serialize};

use super::{UserCreated, UserDeleted, UserUpdated};
use crate::outbox::{epoch_seconds, EventSchemas};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreatedSchema {
    pub user_id: String,
    pub login: String,
    pub name: String,
    pub email: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdatedSchema {
    pub user_id: String,
    pub login: String,
    pub name: String,
    pub email: String,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeletedSchema {
    pub user_id: String,
}

pub fn schemas() -> EventSchemas {
    EventSchemas::new()
        .register("user_created", |e: &UserCreated| UserCreatedSchema {
            user_id: e.user_id.to_string(),
            login: e.login.clone(),
            name: e.name.clone(),
            email: e.email.clone(),
            created_at: epoch_seconds(e.created_at),
        })
        .register("user_updated", |e: &UserUpdated| UserUpdatedSchema {
            user_id: e.user_id.to_string(),
            login: e.login.clone(),
            name: e.name.clone(),
            email: e.email.clone(),
            updated_at: epoch_seconds(e.updated_at),
        })
        .register("user_deleted", |e: &UserDeleted| UserDeletedSchema {
            user_id: e.user_id.to_string(),
        })
}

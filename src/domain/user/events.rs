use std::time::SystemTime;

use uuid::Uuid;

use super::User;
use crate::domain::DomainEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCreated {
    pub user_id: Uuid,
    pub login: String,
    pub name: String,
    pub email: String,
    pub created_at: SystemTime,
}

impl From<&User> for UserCreated {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            login: user.login.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.audit.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdated {
    pub user_id: Uuid,
    pub login: String,
    pub name: String,
    pub email: String,
    pub updated_at: SystemTime,
}

impl From<&User> for UserUpdated {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            login: user.login.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            updated_at: user.audit.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDeleted {
    pub user_id: Uuid,
}

impl DomainEvent for UserCreated {
    fn event_type(&self) -> &'static str {
        "UserCreated"
    }
}

impl DomainEvent for UserUpdated {
    fn event_type(&self) -> &'static str {
        "UserUpdated"
    }
}

impl DomainEvent for UserDeleted {
    fn event_type(&self) -> &'static str {
        "UserDeleted"
    }
}

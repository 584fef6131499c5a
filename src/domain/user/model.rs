use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Audit;
use crate::impl_aggregate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("login must not be empty")]
    EmptyLogin,
    #[error("login {0} is already taken")]
    LoginTaken(String),
    #[error("invalid email {0}")]
    InvalidEmail(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub name: String,
    pub email: String,
    pub audit: Audit,
}

impl_aggregate!(User, "user", id);

impl User {
    pub fn new(id: Uuid, login: &str, name: &str, email: &str, at: SystemTime) -> Self {
        Self {
            id,
            login: login.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            audit: Audit::new(at),
        }
    }
}

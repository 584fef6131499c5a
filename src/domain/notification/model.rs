use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Audit;
use crate::impl_aggregate;

/// A message to a user, derived from one integration event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub body: String,
    /// Natural key of the event this was built from, e.g. `order_paid:<order id>`.
    pub source: String,
    pub audit: Audit,
}

impl_aggregate!(Notification, "notification", id);

/// Who a notification is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

impl Recipient {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Notification {
    /// The id a notification for `source` always gets.
    pub fn id_for(source: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, source.as_bytes())
    }

    pub fn new(source: &str, name: &str, subject: &str, body: &str, at: SystemTime) -> Self {
        Self {
            id: Self::id_for(source),
            name: name.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            source: source.to_string(),
            audit: Audit::new(at),
        }
    }
}

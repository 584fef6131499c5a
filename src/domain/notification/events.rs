use std::time::SystemTime;

use uuid::Uuid;

use crate::domain::DomainEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationCreated {
    pub notification_id: Uuid,
    pub name: String,
    pub source: String,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDeleted {
    pub notification_id: Uuid,
    pub deleted_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSent {
    pub notification_id: Uuid,
    pub recipient_name: String,
    pub recipient_email: String,
    pub sent_at: SystemTime,
}

impl DomainEvent for NotificationCreated {
    fn event_type(&self) -> &'static str {
        "NotificationCreated"
    }
}

impl DomainEvent for NotificationDeleted {
    fn event_type(&self) -> &'static str {
        "NotificationDeleted"
    }
}

impl DomainEvent for NotificationSent {
    fn event_type(&self) -> &'static str {
        "NotificationSent"
    }
}

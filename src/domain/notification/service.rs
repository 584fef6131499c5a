use std::time::SystemTime;

use tracing::debug;
use uuid::Uuid;

use super::{Notification, NotificationCreated, NotificationDeleted, NotificationSent, Recipient};
use crate::domain::{DomainService, Emitted};
use crate::error::Result;
use crate::uow::RepositoryProvider;

pub struct NotificationService<'tx> {
    notifications: DomainService<'tx, Notification>,
}

impl<'tx> NotificationService<'tx> {
    pub fn new(provider: &RepositoryProvider<'tx>) -> Self {
        Self {
            notifications: DomainService::new(provider.repository()),
        }
    }

    /// Store the notification for `source` unless one already exists.
    ///
    /// The id is derived from `source`, so a redelivered event finds the
    /// stored notification and returns it unchanged, without an event.
    pub fn create_notification(
        &self,
        source: &str,
        name: &str,
        subject: &str,
        body: &str,
    ) -> Result<Emitted<Notification>> {
        let id = Notification::id_for(source);
        if let Some(existing) = self.notifications.repository().load(id)? {
            debug!(%id, source, "notification already exists");
            return Ok(Emitted::none(existing));
        }
        let notification = Notification::new(source, name, subject, body, SystemTime::now());
        self.notifications.repository().store(&notification)?;
        let event = NotificationCreated {
            notification_id: id,
            name: notification.name.clone(),
            source: notification.source.clone(),
            created_at: notification.audit.created_at,
        };
        Ok(Emitted::new(notification, event))
    }

    pub fn delete_notification(&self, id: Uuid) -> Result<Emitted<Notification>> {
        let notification = self.notifications.delete(id)?;
        let event = NotificationDeleted {
            notification_id: id,
            deleted_at: notification.audit.updated_at,
        };
        Ok(Emitted::new(notification, event))
    }

    /// Record that the active notification `id` went out to `recipient`.
    pub fn send_notification(&self, id: Uuid, recipient: &Recipient) -> Result<Emitted<Notification>> {
        let notification = self.notifications.find(id)?;
        let event = NotificationSent {
            notification_id: id,
            recipient_name: recipient.name.clone(),
            recipient_email: recipient.email.clone(),
            sent_at: SystemTime::now(),
        };
        Ok(Emitted::new(notification, event))
    }

    pub fn notification(&self, id: Uuid) -> Result<Notification> {
        self.notifications.find(id)
    }

    pub fn notifications(&self) -> Result<Vec<Notification>> {
        self.notifications.repository().list()
    }
}

use uuid::Uuid;

use super::{Notification, NotificationService, Recipient};
use crate::context::Context;
use crate::error::Result;
use crate::uow::UnitOfWork;

/// Notification use cases. Creation is keyed by source event, so it runs
/// without locks: two racing deliveries of one event write the same row and
/// the loser fails with a retryable concurrent-write error.
#[derive(Clone)]
pub struct NotificationApp {
    uow: UnitOfWork,
}

impl NotificationApp {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    pub fn create_notification(
        &self,
        ctx: &Context,
        source: &str,
        name: &str,
        subject: &str,
        body: &str,
    ) -> Result<Notification> {
        self.uow.execute(ctx, |p| {
            p.emit(NotificationService::new(p).create_notification(source, name, subject, body)?)
        })
    }

    pub fn delete_notification(&self, ctx: &Context, id: Uuid) -> Result<Notification> {
        self.uow
            .execute(ctx, |p| p.emit(NotificationService::new(p).delete_notification(id)?))
    }

    pub fn send_notification(&self, ctx: &Context, id: Uuid, recipient: &Recipient) -> Result<Notification> {
        self.uow.execute(ctx, |p| {
            p.emit(NotificationService::new(p).send_notification(id, recipient)?)
        })
    }

    pub fn notification(&self, ctx: &Context, id: Uuid) -> Result<Notification> {
        self.uow
            .execute(ctx, |p| NotificationService::new(p).notification(id))
    }

    pub fn notifications(&self, ctx: &Context) -> Result<Vec<Notification>> {
        self.uow
            .execute(ctx, |p| NotificationService::new(p).notifications())
    }
}

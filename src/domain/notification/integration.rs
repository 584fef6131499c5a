//! Turns order and user events into notifications, and notification events
//! into their wire schemas.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{NotificationApp, NotificationCreated, NotificationDeleted, NotificationSent};
use crate::consumer::EventHandlers;
use crate::context::Context;
use crate::outbox::{epoch_seconds, EventSchemas};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCreatedSchema {
    pub notification_id: String,
    pub name: String,
    pub source: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDeletedSchema {
    pub notification_id: String,
    pub deleted_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSentSchema {
    pub notification_id: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub sent_at: i64,
}

pub fn schemas() -> EventSchemas {
    EventSchemas::new()
        .register("notification_created", |e: &NotificationCreated| NotificationCreatedSchema {
            notification_id: e.notification_id.to_string(),
            name: e.name.clone(),
            source: e.source.clone(),
            created_at: epoch_seconds(e.created_at),
        })
        .register("notification_deleted", |e: &NotificationDeleted| NotificationDeletedSchema {
            notification_id: e.notification_id.to_string(),
            deleted_at: epoch_seconds(e.deleted_at),
        })
        .register("notification_sent", |e: &NotificationSent| NotificationSentSchema {
            notification_id: e.notification_id.to_string(),
            recipient_name: e.recipient_name.clone(),
            recipient_email: e.recipient_email.clone(),
            sent_at: epoch_seconds(e.sent_at),
        })
}

#[derive(Debug, Deserialize)]
pub struct OrderCreatedMessage {
    pub order_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct OrderPaidMessage {
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct OrderCancelledMessage {
    pub order_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct UserCreatedMessage {
    pub user_id: Uuid,
    pub login: String,
}

pub fn handlers(app: NotificationApp) -> EventHandlers {
    let created = app.clone();
    let paid = app.clone();
    let cancelled = app;

    EventHandlers::new()
        .on("order_created", move |ctx: &Context, event: OrderCreatedMessage| {
            created.create_notification(
                ctx,
                &format!("order_created:{}", event.order_id),
                "order_created",
                "Order was created",
                &format!("Order #{} has been created", event.order_id),
            )?;
            info!(order = %event.order_id, user = %event.user_id, "order created notification");
            Ok(())
        })
        .on("order_paid", move |ctx: &Context, event: OrderPaidMessage| {
            paid.create_notification(
                ctx,
                &format!("order_paid:{}", event.order_id),
                "order_paid",
                "Order was paid",
                &format!("Order #{} has been paid successfully.", event.order_id),
            )?;
            info!(order = %event.order_id, "order paid notification");
            Ok(())
        })
        .on("order_cancelled", move |ctx: &Context, event: OrderCancelledMessage| {
            cancelled.create_notification(
                ctx,
                &format!("order_cancelled:{}", event.order_id),
                "order_cancelled",
                "Order was cancelled",
                &format!(
                    "Order #{} has been cancelled. Reason: {}",
                    event.order_id, event.reason
                ),
            )?;
            info!(order = %event.order_id, "order cancelled notification");
            Ok(())
        })
        .on("user_created", |_: &Context, event: UserCreatedMessage| {
            info!(user = %event.user_id, login = %event.login, "user created");
            Ok(())
        })
}

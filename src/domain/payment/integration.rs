//! Wire schemas of payment events, and the payment service's inbound handlers.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{
    Amount, CustomerAccountCreated, CustomerAmountUpdated, PaymentApp, RefundCreated,
    TransactionCreated,
};
use crate::consumer::EventHandlers;
use crate::context::Context;
use crate::outbox::{epoch_seconds, EventSchemas};

/// Starting balance of a wallet opened for a new user.
pub const WELCOME_AMOUNT: Amount = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreatedSchema {
    pub customer_id: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountUpdatedSchema {
    pub customer_id: String,
    pub previous_amount: Amount,
    pub new_amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSchema {
    pub transaction_id: String,
    pub order_id: String,
    pub customer_id: String,
    pub amount: Amount,
    pub payment_date: i64,
}

pub fn schemas() -> EventSchemas {
    EventSchemas::new()
        .register("customer_account_created", |e: &CustomerAccountCreated| {
            AccountCreatedSchema {
                customer_id: e.customer_id.to_string(),
                created_at: epoch_seconds(e.created_at),
            }
        })
        .register("customer_amount_updated", |e: &CustomerAmountUpdated| {
            AmountUpdatedSchema {
                customer_id: e.customer_id.to_string(),
                previous_amount: e.previous_amount,
                new_amount: e.new_amount,
            }
        })
        .register("transaction_created", |e: &TransactionCreated| TransactionSchema {
            transaction_id: e.transaction_id.to_string(),
            order_id: e.order_id.to_string(),
            customer_id: e.customer_id.to_string(),
            amount: e.amount,
            payment_date: epoch_seconds(e.payment_date),
        })
        .register("refund_created", |e: &RefundCreated| TransactionSchema {
            transaction_id: e.transaction_id.to_string(),
            order_id: e.order_id.to_string(),
            customer_id: e.customer_id.to_string(),
            amount: e.amount,
            payment_date: epoch_seconds(e.payment_date),
        })
}

/// The part of `user_created` the payment service reads.
#[derive(Debug, Deserialize)]
pub struct UserCreatedMessage {
    pub user_id: Uuid,
    pub login: String,
}

/// Opens a funded wallet for every new user.
pub fn handlers(app: PaymentApp) -> EventHandlers {
    EventHandlers::new().on("user_created", move |ctx: &Context, event: UserCreatedMessage| {
        let balance = app.store_user_balance(ctx, event.user_id, WELCOME_AMOUNT)?;
        info!(
            user = %event.user_id,
            login = %event.login,
            amount = balance.amount,
            "wallet ready"
        );
        Ok(())
    })
}

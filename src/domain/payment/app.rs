use uuid::Uuid;

use super::{Amount, CustomerBalance, PaymentError, PaymentService, PaymentTransaction};
use crate::context::Context;
use crate::domain::DomainError;
use crate::error::{Error, Result};
use crate::uow::LockableUnitOfWork;

fn balance_lock(customer_id: Uuid) -> String {
    format!("balance_{customer_id}")
}

/// Payment use cases. Every write holds the customer's `balance_<id>` lock,
/// so concurrent debits of one wallet are serialized.
#[derive(Clone)]
pub struct PaymentApp {
    luow: LockableUnitOfWork,
}

impl PaymentApp {
    pub fn new(luow: LockableUnitOfWork) -> Self {
        Self { luow }
    }

    pub fn create_customer_balance(&self, ctx: &Context, customer_id: Uuid) -> Result<CustomerBalance> {
        self.luow.execute(ctx, &[balance_lock(customer_id)], |p| {
            p.emit(PaymentService::new(p).create_customer_balance(customer_id)?)
        })
    }

    pub fn update_balance(&self, ctx: &Context, customer_id: Uuid, amount: Amount) -> Result<CustomerBalance> {
        self.luow.execute(ctx, &[balance_lock(customer_id)], |p| {
            p.emit(PaymentService::new(p).update_balance(customer_id, amount)?)
        })
    }

    pub fn add_amount(&self, ctx: &Context, customer_id: Uuid, amount: Amount) -> Result<CustomerBalance> {
        self.luow.execute(ctx, &[balance_lock(customer_id)], |p| {
            p.emit(PaymentService::new(p).add_amount(customer_id, amount)?)
        })
    }

    pub fn create_transaction(
        &self,
        ctx: &Context,
        order_id: Uuid,
        customer_id: Uuid,
        amount: Amount,
    ) -> Result<PaymentTransaction> {
        self.luow.execute(ctx, &[balance_lock(customer_id)], |p| {
            p.emit(PaymentService::new(p).create_transaction(order_id, customer_id, amount)?)
        })
    }

    pub fn create_refund(
        &self,
        ctx: &Context,
        order_id: Uuid,
        customer_id: Uuid,
        amount: Amount,
    ) -> Result<PaymentTransaction> {
        self.luow.execute(ctx, &[balance_lock(customer_id)], |p| {
            p.emit(PaymentService::new(p).create_refund(order_id, customer_id, amount)?)
        })
    }

    /// Make sure the customer has a wallet, funding a new one with `amount`.
    ///
    /// An existing wallet is returned untouched, so replaying the triggering
    /// event leaves the balance as it is.
    pub fn store_user_balance(&self, ctx: &Context, customer_id: Uuid, amount: Amount) -> Result<CustomerBalance> {
        self.luow.execute(ctx, &[balance_lock(customer_id)], |p| {
            let service = PaymentService::new(p);
            match service.create_customer_balance(customer_id) {
                Ok(created) => {
                    p.emit(created)?;
                    p.emit(service.update_balance(customer_id, amount)?)
                }
                Err(Error::Domain(DomainError::Payment(PaymentError::BalanceExisted(_)))) => {
                    service.balance(customer_id)
                }
                Err(err) => Err(err),
            }
        })
    }

    pub fn balance(&self, ctx: &Context, customer_id: Uuid) -> Result<CustomerBalance> {
        self.luow
            .unit_of_work()
            .execute(ctx, |p| PaymentService::new(p).balance(customer_id))
    }

    pub fn transactions(&self, ctx: &Context, customer_id: Uuid) -> Result<Vec<PaymentTransaction>> {
        self.luow
            .unit_of_work()
            .execute(ctx, |p| PaymentService::new(p).transactions_of(customer_id))
    }
}

use std::time::SystemTime;

use uuid::Uuid;

use super::{
    Amount, CustomerAccountCreated, CustomerAmountUpdated, CustomerBalance, PaymentError,
    PaymentTransaction, RefundCreated, TransactionCreated, TransactionKind,
};
use crate::domain::{DomainError, DomainService, Emitted, Invariants};
use crate::error::Result;
use crate::uow::RepositoryProvider;

/// A balance never goes below zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceInvariants;

impl Invariants<CustomerBalance> for BalanceInvariants {
    fn check(&self, balance: &CustomerBalance) -> Result<(), DomainError> {
        if balance.amount < 0 {
            return Err(PaymentError::NegativeBalance {
                customer_id: balance.customer_id,
                amount: balance.amount,
            }
            .into());
        }
        Ok(())
    }
}

fn non_negative(amount: Amount) -> Result<(), DomainError> {
    if amount < 0 {
        return Err(PaymentError::NegativeAmount(amount).into());
    }
    Ok(())
}

/// Balances and transactions of customers.
pub struct PaymentService<'tx> {
    balances: DomainService<'tx, CustomerBalance, BalanceInvariants>,
    transactions: DomainService<'tx, PaymentTransaction>,
}

impl<'tx> PaymentService<'tx> {
    pub fn new(provider: &RepositoryProvider<'tx>) -> Self {
        Self {
            balances: DomainService::with_invariants(provider.repository(), BalanceInvariants),
            transactions: DomainService::new(provider.repository()),
        }
    }

    pub fn balance(&self, customer_id: Uuid) -> Result<CustomerBalance> {
        self.balances.find(customer_id)
    }

    pub fn transactions_of(&self, customer_id: Uuid) -> Result<Vec<PaymentTransaction>> {
        self.transactions
            .repository()
            .find_all_by(|t| t.customer_id == customer_id)
    }

    /// Open an empty wallet. Fails with `BalanceExisted` if one is active.
    pub fn create_customer_balance(&self, customer_id: Uuid) -> Result<Emitted<CustomerBalance>> {
        if self.balances.repository().exists(customer_id)? {
            return Err(PaymentError::BalanceExisted(customer_id).into());
        }
        let balance = self
            .balances
            .create(|_, now| CustomerBalance::new(customer_id, now))?;
        let event = CustomerAccountCreated {
            customer_id,
            created_at: balance.audit.created_at,
        };
        Ok(Emitted::new(balance, event))
    }

    /// Set the balance to an absolute amount.
    pub fn update_balance(&self, customer_id: Uuid, amount: Amount) -> Result<Emitted<CustomerBalance>> {
        non_negative(amount)?;
        let change = self.balances.update(customer_id, |balance| {
            balance.amount = amount;
            Ok(())
        })?;
        let event = CustomerAmountUpdated {
            customer_id,
            previous_amount: change.before.amount,
            new_amount: change.after.amount,
        };
        Ok(Emitted::new(change.after, event))
    }

    /// Top up the balance.
    pub fn add_amount(&self, customer_id: Uuid, amount: Amount) -> Result<Emitted<CustomerBalance>> {
        non_negative(amount)?;
        let change = self.balances.update(customer_id, |balance| {
            balance.amount = balance.amount.saturating_add(amount);
            Ok(())
        })?;
        let event = CustomerAmountUpdated {
            customer_id,
            previous_amount: change.before.amount,
            new_amount: change.after.amount,
        };
        Ok(Emitted::new(change.after, event))
    }

    /// Debit `amount` for an order.
    pub fn create_transaction(
        &self,
        order_id: Uuid,
        customer_id: Uuid,
        amount: Amount,
    ) -> Result<Emitted<PaymentTransaction>> {
        non_negative(amount)?;
        self.balances.update(customer_id, |balance| {
            if balance.amount < amount {
                return Err(PaymentError::NotEnoughAmount {
                    customer_id,
                    available: balance.amount,
                    requested: amount,
                }
                .into());
            }
            balance.amount -= amount;
            Ok(())
        })?;

        let transaction = self.record(order_id, customer_id, TransactionKind::Payment, amount)?;
        let event = TransactionCreated {
            transaction_id: transaction.id,
            order_id,
            customer_id,
            amount,
            payment_date: transaction.payment_date,
        };
        Ok(Emitted::new(transaction, event))
    }

    /// Credit `amount` back for an order.
    pub fn create_refund(
        &self,
        order_id: Uuid,
        customer_id: Uuid,
        amount: Amount,
    ) -> Result<Emitted<PaymentTransaction>> {
        non_negative(amount)?;
        self.balances.update(customer_id, |balance| {
            balance.amount = balance.amount.saturating_add(amount);
            Ok(())
        })?;

        let transaction = self.record(order_id, customer_id, TransactionKind::Refund, amount)?;
        let event = RefundCreated {
            transaction_id: transaction.id,
            order_id,
            customer_id,
            amount,
            payment_date: transaction.payment_date,
        };
        Ok(Emitted::new(transaction, event))
    }

    fn record(
        &self,
        order_id: Uuid,
        customer_id: Uuid,
        kind: TransactionKind,
        amount: Amount,
    ) -> Result<PaymentTransaction> {
        self.transactions.create(|id, now: SystemTime| PaymentTransaction {
            id,
            order_id,
            customer_id,
            kind,
            amount,
            payment_date: now,
            audit: crate::domain::Audit::new(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::outbox::{EventDispatcher, EventSchemas};
    use crate::store::InMemoryStore;
    use crate::uow::UnitOfWork;
    use crate::Error;

    fn uow() -> UnitOfWork {
        UnitOfWork::new(
            InMemoryStore::new(),
            EventDispatcher::new("payment", "default", EventSchemas::new()),
        )
    }

    fn payment_error(err: Error) -> PaymentError {
        match err {
            Error::Domain(DomainError::Payment(err)) => err,
            other => panic!("expected a payment error, got {other:?}"),
        }
    }

    fn with_balance(uow: &UnitOfWork, customer: Uuid, amount: Amount) {
        uow.execute(&Context::background(), |p| {
            let service = PaymentService::new(p);
            let _ = service.create_customer_balance(customer)?;
            let _ = service.update_balance(customer, amount)?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn new_balance_is_empty() {
        let uow = uow();
        let customer = Uuid::new_v4();

        let emitted = uow
            .execute(&Context::background(), |p| {
                PaymentService::new(p).create_customer_balance(customer)
            })
            .unwrap();

        assert_eq!(emitted.value.amount, 0);
        assert_eq!(emitted.event_types(), vec!["CustomerAccountCreated"]);
    }

    #[test]
    fn second_balance_for_same_customer_is_rejected() {
        let uow = uow();
        let customer = Uuid::new_v4();
        with_balance(&uow, customer, 0);

        let err = uow
            .execute(&Context::background(), |p| {
                PaymentService::new(p).create_customer_balance(customer)
            })
            .unwrap_err();

        assert_eq!(payment_error(err), PaymentError::BalanceExisted(customer));
    }

    #[test]
    fn transaction_debits_the_balance() {
        let uow = uow();
        let customer = Uuid::new_v4();
        let order = Uuid::new_v4();
        with_balance(&uow, customer, 100);

        let emitted = uow
            .execute(&Context::background(), |p| {
                PaymentService::new(p).create_transaction(order, customer, 50)
            })
            .unwrap();

        assert_eq!(emitted.value.kind, TransactionKind::Payment);
        assert_eq!(emitted.event_types(), vec!["TransactionCreated"]);
        let balance = uow
            .execute(&Context::background(), |p| PaymentService::new(p).balance(customer))
            .unwrap();
        assert_eq!(balance.amount, 50);
    }

    #[test]
    fn transaction_above_balance_is_rejected_without_changes() {
        let uow = uow();
        let customer = Uuid::new_v4();
        with_balance(&uow, customer, 30);

        let err = uow
            .execute(&Context::background(), |p| {
                PaymentService::new(p).create_transaction(Uuid::new_v4(), customer, 50)
            })
            .unwrap_err();

        assert_eq!(
            payment_error(err),
            PaymentError::NotEnoughAmount {
                customer_id: customer,
                available: 30,
                requested: 50,
            }
        );
        let (balance, transactions) = uow
            .execute(&Context::background(), |p| {
                let service = PaymentService::new(p);
                Ok((service.balance(customer)?, service.transactions_of(customer)?))
            })
            .unwrap();
        assert_eq!(balance.amount, 30);
        assert!(transactions.is_empty());
    }

    #[test]
    fn refund_credits_the_balance() {
        let uow = uow();
        let customer = Uuid::new_v4();
        with_balance(&uow, customer, 10);

        let emitted = uow
            .execute(&Context::background(), |p| {
                PaymentService::new(p).create_refund(Uuid::new_v4(), customer, 15)
            })
            .unwrap();

        assert_eq!(emitted.value.kind, TransactionKind::Refund);
        assert_eq!(emitted.event_types(), vec!["RefundCreated"]);
        let balance = uow
            .execute(&Context::background(), |p| PaymentService::new(p).balance(customer))
            .unwrap();
        assert_eq!(balance.amount, 25);
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let uow = uow();
        let customer = Uuid::new_v4();
        with_balance(&uow, customer, 10);

        for result in [
            uow.execute(&Context::background(), |p| {
                PaymentService::new(p).update_balance(customer, -1).map(|_| ())
            }),
            uow.execute(&Context::background(), |p| {
                PaymentService::new(p).add_amount(customer, -1).map(|_| ())
            }),
            uow.execute(&Context::background(), |p| {
                PaymentService::new(p).create_refund(Uuid::new_v4(), customer, -1).map(|_| ())
            }),
        ] {
            assert_eq!(payment_error(result.unwrap_err()), PaymentError::NegativeAmount(-1));
        }
    }

    #[test]
    fn missing_balance_is_not_found() {
        let uow = uow();
        let err = uow
            .execute(&Context::background(), |p| {
                PaymentService::new(p).create_transaction(Uuid::new_v4(), Uuid::new_v4(), 1)
            })
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn add_amount_reports_previous_and_new() {
        let uow = uow();
        let customer = Uuid::new_v4();
        with_balance(&uow, customer, 5);

        let emitted = uow
            .execute(&Context::background(), |p| PaymentService::new(p).add_amount(customer, 7))
            .unwrap();

        assert_eq!(emitted.value.amount, 12);
        let event = emitted.events[0]
            .as_ref()
            .as_any()
            .downcast_ref::<CustomerAmountUpdated>()
            .unwrap();
        assert_eq!((event.previous_amount, event.new_amount), (5, 12));
    }
}

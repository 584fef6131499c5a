use std::time::SystemTime;

use uuid::Uuid;

use super::{
    LocalProduct, Order, OrderCancelled, OrderCreated, OrderDeleted, OrderError, OrderItem,
    OrderItemChanged, OrderPaid, OrderStatus, OrderStatusChanged,
};
use crate::domain::{DomainError, DomainService, Emitted, Invariants};
use crate::error::Result;
use crate::uow::{Repository, RepositoryProvider};

/// Submitted and paid orders always carry at least one item.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderInvariants;

impl Invariants<Order> for OrderInvariants {
    fn check(&self, order: &Order) -> Result<(), DomainError> {
        let needs_items = matches!(order.status, OrderStatus::Pending | OrderStatus::Paid);
        if needs_items && order.items.is_empty() {
            return Err(OrderError::Empty(order.id).into());
        }
        Ok(())
    }
}

pub struct OrderService<'tx> {
    orders: DomainService<'tx, Order, OrderInvariants>,
    products: Repository<'tx, LocalProduct>,
}

impl<'tx> OrderService<'tx> {
    pub fn new(provider: &RepositoryProvider<'tx>) -> Self {
        Self {
            orders: DomainService::with_invariants(provider.repository(), OrderInvariants),
            products: provider.repository(),
        }
    }

    pub fn order(&self, order_id: Uuid) -> Result<Order> {
        self.orders.find(order_id)
    }

    pub fn orders_of(&self, customer_id: Uuid) -> Result<Vec<Order>> {
        self.orders
            .repository()
            .find_all_by(|o| o.customer_id == customer_id)
    }

    /// The customer's open order, if any.
    pub fn open_order(&self, customer_id: Uuid) -> Result<Option<Order>> {
        let mut open = self
            .orders
            .repository()
            .find_all_by(|o| o.customer_id == customer_id && o.status == OrderStatus::Open)?;
        Ok(if open.is_empty() { None } else { Some(open.swap_remove(0)) })
    }

    pub fn create_order(&self, customer_id: Uuid) -> Result<Emitted<Order>> {
        let order = self.orders.create(|id, now| Order::new(id, customer_id, now))?;
        let event = OrderCreated {
            order_id: order.id,
            customer_id,
            items: order.items.clone(),
            total_price: order.total_price(),
            created_at: order.audit.created_at,
        };
        Ok(Emitted::new(order, event))
    }

    /// The customer's open order, created when there is none.
    pub fn find_or_create_open_order(&self, customer_id: Uuid) -> Result<Emitted<Order>> {
        match self.open_order(customer_id)? {
            Some(order) => Ok(Emitted::none(order)),
            None => self.create_order(customer_id),
        }
    }

    /// Add one unit of `product_id` at its current local price.
    pub fn add_item(&self, order_id: Uuid, customer_id: Uuid, product_id: Uuid) -> Result<Emitted<OrderItem>> {
        let product = self.products.find(product_id)?;
        let item = OrderItem {
            id: self.orders.repository().next_id(),
            product_id,
            price: product.price,
        };
        self.orders.update(order_id, |order| {
            order.ensure_owner(customer_id)?;
            order.ensure_open()?;
            order.items.push(item.clone());
            Ok(())
        })?;
        let event = OrderItemChanged {
            order_id,
            added: vec![item.clone()],
            removed: Vec::new(),
        };
        Ok(Emitted::new(item, event))
    }

    pub fn delete_item(&self, order_id: Uuid, customer_id: Uuid, item_id: Uuid) -> Result<Emitted<Order>> {
        let change = self.orders.update(order_id, |order| {
            order.ensure_owner(customer_id)?;
            order.ensure_open()?;
            let position = order
                .items
                .iter()
                .position(|item| item.id == item_id)
                .ok_or(OrderError::ItemNotFound { order_id, item_id })?;
            order.items.remove(position);
            Ok(())
        })?;
        let event = OrderItemChanged {
            order_id,
            added: Vec::new(),
            removed: vec![item_id],
        };
        Ok(Emitted::new(change.after, event))
    }

    /// Move the order along its status machine.
    pub fn set_status(&self, order_id: Uuid, status: OrderStatus) -> Result<Emitted<Order>> {
        let mut from = status;
        let change = self.orders.update(order_id, |order| {
            from = order.transition(status)?;
            Ok(())
        })?;
        let event = OrderStatusChanged {
            order_id,
            from,
            to: status,
        };
        Ok(Emitted::new(change.after, event))
    }

    /// Submit the open order for payment.
    pub fn save_order(&self, order_id: Uuid) -> Result<Emitted<Order>> {
        self.set_status(order_id, OrderStatus::Pending)
    }

    pub fn pay_order(&self, order_id: Uuid) -> Result<Emitted<Order>> {
        let emitted = self.set_status(order_id, OrderStatus::Paid)?;
        let event = OrderPaid {
            order_id,
            customer_id: emitted.value.customer_id,
            total_price: emitted.value.total_price(),
            paid_at: emitted.value.audit.updated_at,
        };
        Ok(emitted.and(event))
    }

    pub fn cancel_order(&self, order_id: Uuid, reason: &str) -> Result<Emitted<Order>> {
        let emitted = self.set_status(order_id, OrderStatus::Cancelled)?;
        let event = OrderCancelled {
            order_id,
            reason: reason.to_string(),
            cancelled_at: emitted.value.audit.updated_at,
        };
        Ok(emitted.and(event))
    }

    pub fn delete_order(&self, order_id: Uuid) -> Result<Emitted<Order>> {
        let order = self.orders.delete(order_id)?;
        let event = OrderDeleted {
            order_id,
            deleted_at: order.audit.lifecycle.deleted_at().unwrap_or_else(SystemTime::now),
        };
        Ok(Emitted::new(order, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::domain::Audit;
    use crate::outbox::{EventDispatcher, EventSchemas};
    use crate::store::InMemoryStore;
    use crate::uow::UnitOfWork;
    use crate::Error;

    fn uow() -> UnitOfWork {
        UnitOfWork::new(
            InMemoryStore::new(),
            EventDispatcher::new("order", "default", EventSchemas::new()),
        )
    }

    fn order_error(err: Error) -> OrderError {
        match err {
            Error::Domain(DomainError::Order(err)) => err,
            other => panic!("expected an order error, got {other:?}"),
        }
    }

    fn product(uow: &UnitOfWork, price: i64) -> Uuid {
        let product_id = Uuid::new_v4();
        uow.execute(&Context::background(), |p| {
            p.repository::<LocalProduct>().store(&LocalProduct {
                product_id,
                name: "lamp".into(),
                price,
                audit: Audit::new(SystemTime::now()),
            })
        })
        .unwrap();
        product_id
    }

    fn open_order_with_item(uow: &UnitOfWork, customer: Uuid, price: i64) -> (Uuid, Uuid) {
        let product_id = product(uow, price);
        uow.execute(&Context::background(), |p| {
            let service = OrderService::new(p);
            let order = service.create_order(customer)?.value;
            let item = service.add_item(order.id, customer, product_id)?.value;
            Ok((order.id, item.id))
        })
        .unwrap()
    }

    fn run<T>(uow: &UnitOfWork, f: impl FnOnce(&OrderService<'_>) -> Result<T>) -> Result<T> {
        uow.execute(&Context::background(), |p| f(&OrderService::new(p)))
    }

    #[test]
    fn find_or_create_reuses_the_open_order() {
        let uow = uow();
        let customer = Uuid::new_v4();

        let first = run(&uow, |s| s.find_or_create_open_order(customer)).unwrap();
        let second = run(&uow, |s| s.find_or_create_open_order(customer)).unwrap();

        assert_eq!(first.event_types(), vec!["OrderCreated"]);
        assert!(second.events.is_empty());
        assert_eq!(first.value.id, second.value.id);
    }

    #[test]
    fn item_takes_the_local_price() {
        let uow = uow();
        let customer = Uuid::new_v4();
        let (order_id, _) = open_order_with_item(&uow, customer, 320);

        let order = run(&uow, |s| s.order(order_id)).unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_price(), 320);
    }

    #[test]
    fn unknown_product_is_not_found() {
        let uow = uow();
        let customer = Uuid::new_v4();
        let order = run(&uow, |s| s.create_order(customer)).unwrap().value;

        let err = run(&uow, |s| s.add_item(order.id, customer, Uuid::new_v4())).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn other_customers_cannot_touch_the_order() {
        let uow = uow();
        let customer = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let (order_id, item_id) = open_order_with_item(&uow, customer, 10);

        let err = run(&uow, |s| s.delete_item(order_id, intruder, item_id)).unwrap_err();
        assert_eq!(
            order_error(err),
            OrderError::AccessDenied {
                order_id,
                customer_id: intruder
            }
        );
    }

    #[test]
    fn removing_a_missing_item_fails() {
        let uow = uow();
        let customer = Uuid::new_v4();
        let (order_id, _) = open_order_with_item(&uow, customer, 10);
        let missing = Uuid::new_v4();

        let err = run(&uow, |s| s.delete_item(order_id, customer, missing)).unwrap_err();
        assert_eq!(
            order_error(err),
            OrderError::ItemNotFound {
                order_id,
                item_id: missing
            }
        );
    }

    #[test]
    fn submitted_order_is_frozen() {
        let uow = uow();
        let customer = Uuid::new_v4();
        let (order_id, item_id) = open_order_with_item(&uow, customer, 10);

        let saved = run(&uow, |s| s.save_order(order_id)).unwrap();
        assert_eq!(saved.event_types(), vec!["OrderStatusChanged"]);

        let err = run(&uow, |s| s.delete_item(order_id, customer, item_id)).unwrap_err();
        assert_eq!(
            order_error(err),
            OrderError::InvalidStatus {
                order_id,
                status: OrderStatus::Pending
            }
        );
    }

    #[test]
    fn empty_order_cannot_be_submitted() {
        let uow = uow();
        let order = run(&uow, |s| s.create_order(Uuid::new_v4())).unwrap().value;

        let err = run(&uow, |s| s.save_order(order.id)).unwrap_err();
        assert_eq!(order_error(err), OrderError::Empty(order.id));
        assert_eq!(run(&uow, |s| s.order(order.id)).unwrap().status, OrderStatus::Open);
    }

    #[test]
    fn pay_then_cancel_is_rejected() {
        let uow = uow();
        let customer = Uuid::new_v4();
        let (order_id, _) = open_order_with_item(&uow, customer, 40);
        run(&uow, |s| s.save_order(order_id)).unwrap();

        let paid = run(&uow, |s| s.pay_order(order_id)).unwrap();
        assert_eq!(paid.event_types(), vec!["OrderStatusChanged", "OrderPaid"]);

        let err = run(&uow, |s| s.cancel_order(order_id, "changed my mind")).unwrap_err();
        assert_eq!(
            order_error(err),
            OrderError::InvalidTransition {
                order_id,
                from: OrderStatus::Paid,
                to: OrderStatus::Cancelled
            }
        );
    }

    #[test]
    fn paying_twice_reports_already_paid() {
        let uow = uow();
        let customer = Uuid::new_v4();
        let (order_id, _) = open_order_with_item(&uow, customer, 40);
        run(&uow, |s| s.save_order(order_id)).unwrap();
        run(&uow, |s| s.pay_order(order_id)).unwrap();

        let err = run(&uow, |s| s.pay_order(order_id)).unwrap_err();
        assert_eq!(
            order_error(err),
            OrderError::AlreadyInStatus {
                order_id,
                status: OrderStatus::Paid
            }
        );
    }

    #[test]
    fn deleted_order_is_gone() {
        let uow = uow();
        let order = run(&uow, |s| s.create_order(Uuid::new_v4())).unwrap().value;

        let deleted = run(&uow, |s| s.delete_order(order.id)).unwrap();
        assert_eq!(deleted.event_types(), vec!["OrderDeleted"]);
        assert!(run(&uow, |s| s.order(order.id)).unwrap_err().is_not_found());
    }
}

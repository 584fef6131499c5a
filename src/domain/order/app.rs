use uuid::Uuid;

use super::{Order, OrderItem, OrderService};
use crate::context::Context;
use crate::error::Result;
use crate::uow::LockableUnitOfWork;

fn customer_lock(customer_id: Uuid) -> String {
    format!("customer_{customer_id}")
}

fn order_lock(order_id: Uuid) -> String {
    format!("order_{order_id}")
}

/// Order use cases.
///
/// Item changes and status transitions run under `order_<id>`. Picking the
/// customer's open order runs under `customer_<id>` first, so two concurrent
/// first purchases of one customer share a single open order.
#[derive(Clone)]
pub struct OrderApp {
    luow: LockableUnitOfWork,
}

impl OrderApp {
    pub fn new(luow: LockableUnitOfWork) -> Self {
        Self { luow }
    }

    /// Add one unit of the product to the customer's open order, opening one
    /// if needed. Returns the order id and the new item.
    pub fn add_product_to_order(
        &self,
        ctx: &Context,
        customer_id: Uuid,
        product_id: Uuid,
    ) -> Result<(Uuid, OrderItem)> {
        let order = self.luow.execute(ctx, &[customer_lock(customer_id)], |p| {
            p.emit(OrderService::new(p).find_or_create_open_order(customer_id)?)
        })?;

        let item = self.luow.execute(ctx, &[order_lock(order.id)], |p| {
            p.emit(OrderService::new(p).add_item(order.id, customer_id, product_id)?)
        })?;
        Ok((order.id, item))
    }

    pub fn remove_product_from_order(
        &self,
        ctx: &Context,
        customer_id: Uuid,
        order_id: Uuid,
        item_id: Uuid,
    ) -> Result<Order> {
        self.luow.execute(ctx, &[order_lock(order_id)], |p| {
            p.emit(OrderService::new(p).delete_item(order_id, customer_id, item_id)?)
        })
    }

    pub fn save_order(&self, ctx: &Context, order_id: Uuid) -> Result<Order> {
        self.luow.execute(ctx, &[order_lock(order_id)], |p| {
            p.emit(OrderService::new(p).save_order(order_id)?)
        })
    }

    pub fn pay_order(&self, ctx: &Context, order_id: Uuid) -> Result<Order> {
        self.luow.execute(ctx, &[order_lock(order_id)], |p| {
            p.emit(OrderService::new(p).pay_order(order_id)?)
        })
    }

    pub fn cancel_order(&self, ctx: &Context, order_id: Uuid, reason: &str) -> Result<Order> {
        self.luow.execute(ctx, &[order_lock(order_id)], |p| {
            p.emit(OrderService::new(p).cancel_order(order_id, reason)?)
        })
    }

    pub fn delete_order(&self, ctx: &Context, order_id: Uuid) -> Result<Order> {
        self.luow.execute(ctx, &[order_lock(order_id)], |p| {
            p.emit(OrderService::new(p).delete_order(order_id)?)
        })
    }

    pub fn order(&self, ctx: &Context, order_id: Uuid) -> Result<Order> {
        self.luow
            .unit_of_work()
            .execute(ctx, |p| OrderService::new(p).order(order_id))
    }

    pub fn open_order(&self, ctx: &Context, customer_id: Uuid) -> Result<Option<Order>> {
        self.luow
            .unit_of_work()
            .execute(ctx, |p| OrderService::new(p).open_order(customer_id))
    }
}

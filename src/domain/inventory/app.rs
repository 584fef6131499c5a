use uuid::Uuid;

use super::{InventoryService, Product, Quantity};
use crate::context::Context;
use crate::domain::payment::Amount;
use crate::error::Result;
use crate::uow::{LockableUnitOfWork, UnitOfWork};

fn product_lock(product_id: Uuid) -> String {
    format!("product_{product_id}")
}

/// Inventory use cases; stock changes of one product are serialized on
/// `product_<id>`.
#[derive(Clone)]
pub struct InventoryApp {
    luow: LockableUnitOfWork,
}

impl InventoryApp {
    pub fn new(luow: LockableUnitOfWork) -> Self {
        Self { luow }
    }

    fn uow(&self) -> &UnitOfWork {
        self.luow.unit_of_work()
    }

    // A new id cannot be contended, so creation needs no lock.
    pub fn create_product(&self, ctx: &Context, name: &str, price: Amount, quantity: Quantity) -> Result<Product> {
        self.uow().execute(ctx, |p| {
            p.emit(InventoryService::new(p).create_product(name, price, quantity)?)
        })
    }

    pub fn increase_quantity(&self, ctx: &Context, product_id: Uuid, by: Quantity) -> Result<Product> {
        self.luow.execute(ctx, &[product_lock(product_id)], |p| {
            p.emit(InventoryService::new(p).increase_quantity(product_id, by)?)
        })
    }

    pub fn decrease_quantity(&self, ctx: &Context, product_id: Uuid, by: Quantity) -> Result<Product> {
        self.luow.execute(ctx, &[product_lock(product_id)], |p| {
            p.emit(InventoryService::new(p).decrease_quantity(product_id, by)?)
        })
    }

    pub fn update_product(&self, ctx: &Context, product_id: Uuid, name: &str, price: Amount) -> Result<Product> {
        self.luow.execute(ctx, &[product_lock(product_id)], |p| {
            p.emit(InventoryService::new(p).update_product(product_id, name, price)?)
        })
    }

    pub fn delete_product(&self, ctx: &Context, product_id: Uuid) -> Result<Product> {
        self.luow.execute(ctx, &[product_lock(product_id)], |p| {
            p.emit(InventoryService::new(p).delete_product(product_id)?)
        })
    }

    pub fn product(&self, ctx: &Context, product_id: Uuid) -> Result<Product> {
        self.uow()
            .execute(ctx, |p| InventoryService::new(p).product(product_id))
    }
}

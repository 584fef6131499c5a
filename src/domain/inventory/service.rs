use uuid::Uuid;

use super::{
    InventoryError, Product, ProductCreated, ProductDeleted, ProductQuantityChanged,
    ProductUpdated, Quantity,
};
use crate::domain::payment::Amount;
use crate::domain::{Change, DomainError, DomainService, Emitted, Invariants};
use crate::error::Result;
use crate::uow::RepositoryProvider;

/// Stock never goes negative and prices are never negative.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockInvariants;

impl Invariants<Product> for StockInvariants {
    fn check(&self, product: &Product) -> Result<(), DomainError> {
        if product.quantity < 0 {
            return Err(InventoryError::QuantityBelowZero {
                product_id: product.id,
                quantity: product.quantity,
            }
            .into());
        }
        if product.price < 0 {
            return Err(InventoryError::NegativePrice(product.price).into());
        }
        Ok(())
    }
}

fn positive(quantity: Quantity) -> Result<(), DomainError> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity(quantity).into());
    }
    Ok(())
}

fn quantity_changed(change: Change<Product>) -> Emitted<Product> {
    let event = ProductQuantityChanged {
        product_id: change.after.id,
        previous_quantity: change.before.quantity,
        new_quantity: change.after.quantity,
    };
    Emitted::new(change.after, event)
}

pub struct InventoryService<'tx> {
    products: DomainService<'tx, Product, StockInvariants>,
}

impl<'tx> InventoryService<'tx> {
    pub fn new(provider: &RepositoryProvider<'tx>) -> Self {
        Self {
            products: DomainService::with_invariants(provider.repository(), StockInvariants),
        }
    }

    pub fn product(&self, product_id: Uuid) -> Result<Product> {
        self.products.find(product_id)
    }

    pub fn products(&self) -> Result<Vec<Product>> {
        self.products.repository().list()
    }

    pub fn create_product(&self, name: &str, price: Amount, quantity: Quantity) -> Result<Emitted<Product>> {
        let product = self
            .products
            .create(|id, now| Product::new(id, name, price, quantity, now))?;
        let event = ProductCreated {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity: product.quantity,
            created_at: product.audit.created_at,
        };
        Ok(Emitted::new(product, event))
    }

    pub fn increase_quantity(&self, product_id: Uuid, by: Quantity) -> Result<Emitted<Product>> {
        positive(by)?;
        let change = self.products.update(product_id, |product| {
            product.quantity = product.quantity.saturating_add(by);
            Ok(())
        })?;
        Ok(quantity_changed(change))
    }

    /// Take `by` units out of stock. Fails without changes if there are fewer.
    pub fn decrease_quantity(&self, product_id: Uuid, by: Quantity) -> Result<Emitted<Product>> {
        positive(by)?;
        let change = self.products.update(product_id, |product| {
            product.quantity -= by;
            Ok(())
        })?;
        Ok(quantity_changed(change))
    }

    pub fn update_product(&self, product_id: Uuid, name: &str, price: Amount) -> Result<Emitted<Product>> {
        let change = self.products.update(product_id, |product| {
            product.name = name.to_string();
            product.price = price;
            Ok(())
        })?;
        let event = ProductUpdated {
            product_id,
            name: change.after.name.clone(),
            price: change.after.price,
        };
        Ok(Emitted::new(change.after, event))
    }

    pub fn delete_product(&self, product_id: Uuid) -> Result<Emitted<Product>> {
        let product = self.products.delete(product_id)?;
        Ok(Emitted::new(product, ProductDeleted { product_id }))
    }
}

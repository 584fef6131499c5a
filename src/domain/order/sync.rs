use uuid::Uuid;

use super::{LocalProduct, LocalUser};
use crate::context::Context;
use crate::domain::payment::Amount;
use crate::domain::{Audit, DomainService};
use crate::error::Result;
use crate::uow::UnitOfWork;

/// Keeps the order service's copies of users and products up to date.
///
/// Every sync is an upsert keyed by the upstream id, so replays and
/// out-of-order create/update deliveries converge on the last write.
#[derive(Clone)]
pub struct DataSync {
    uow: UnitOfWork,
}

impl DataSync {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    pub fn sync_user(&self, ctx: &Context, user_id: Uuid, login: &str) -> Result<LocalUser> {
        self.uow.execute(ctx, |p| {
            DomainService::new(p.repository::<LocalUser>()).upsert(
                user_id,
                |now| LocalUser {
                    user_id,
                    login: login.to_string(),
                    audit: Audit::new(now),
                },
                |user| user.login = login.to_string(),
            )
        })
    }

    pub fn sync_product(&self, ctx: &Context, product_id: Uuid, name: &str, price: Amount) -> Result<LocalProduct> {
        self.uow.execute(ctx, |p| {
            DomainService::new(p.repository::<LocalProduct>()).upsert(
                product_id,
                |now| LocalProduct {
                    product_id,
                    name: name.to_string(),
                    price,
                    audit: Audit::new(now),
                },
                |product| {
                    product.name = name.to_string();
                    product.price = price;
                },
            )
        })
    }

    pub fn user(&self, ctx: &Context, user_id: Uuid) -> Result<LocalUser> {
        self.uow.execute(ctx, |p| p.repository::<LocalUser>().find(user_id))
    }

    pub fn product(&self, ctx: &Context, product_id: Uuid) -> Result<LocalProduct> {
        self.uow.execute(ctx, |p| p.repository::<LocalProduct>().find(product_id))
    }
}

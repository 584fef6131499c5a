use uuid::Uuid;

use super::{User, UserService};
use crate::context::Context;
use crate::error::Result;
use crate::uow::LockableUnitOfWork;

/// User use cases. Registration locks the login so two sign-ups with the
/// same login cannot both pass the uniqueness check.
#[derive(Clone)]
pub struct UserApp {
    luow: LockableUnitOfWork,
}

impl UserApp {
    pub fn new(luow: LockableUnitOfWork) -> Self {
        Self { luow }
    }

    pub fn create_user(&self, ctx: &Context, login: &str, name: &str, email: &str) -> Result<User> {
        self.luow.execute(ctx, &[format!("login_{login}")], |p| {
            p.emit(UserService::new(p).create_user(login, name, email)?)
        })
    }

    pub fn update_user(&self, ctx: &Context, user_id: Uuid, name: &str, email: &str) -> Result<User> {
        self.luow.execute(ctx, &[format!("user_{user_id}")], |p| {
            p.emit(UserService::new(p).update_user(user_id, name, email)?)
        })
    }

    pub fn delete_user(&self, ctx: &Context, user_id: Uuid) -> Result<User> {
        self.luow.execute(ctx, &[format!("user_{user_id}")], |p| {
            p.emit(UserService::new(p).delete_user(user_id)?)
        })
    }

    pub fn user(&self, ctx: &Context, user_id: Uuid) -> Result<User> {
        self.luow
            .unit_of_work()
            .execute(ctx, |p| UserService::new(p).user(user_id))
    }
}

use uuid::Uuid;

use super::{User, UserCreated, UserDeleted, UserError, UserUpdated};
use crate::domain::{DomainError, DomainService, Emitted, Invariants};
use crate::error::Result;
use crate::uow::RepositoryProvider;

/// Logins are non-empty and emails look like emails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserInvariants;

impl Invariants<User> for UserInvariants {
    fn check(&self, user: &User) -> Result<(), DomainError> {
        if user.login.trim().is_empty() {
            return Err(UserError::EmptyLogin.into());
        }
        let valid_email = user
            .email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid_email {
            return Err(UserError::InvalidEmail(user.email.clone()).into());
        }
        Ok(())
    }
}

pub struct UserService<'tx> {
    users: DomainService<'tx, User, UserInvariants>,
}

impl<'tx> UserService<'tx> {
    pub fn new(provider: &RepositoryProvider<'tx>) -> Self {
        Self {
            users: DomainService::with_invariants(provider.repository(), UserInvariants),
        }
    }

    pub fn user(&self, user_id: Uuid) -> Result<User> {
        self.users.find(user_id)
    }

    pub fn find_by_login(&self, login: &str) -> Result<User> {
        self.users.repository().find_by(|u| u.login == login)
    }

    /// Register a user. Logins are unique among active users.
    pub fn create_user(&self, login: &str, name: &str, email: &str) -> Result<Emitted<User>> {
        let taken = self.users.repository().find_all_by(|u| u.login == login)?;
        if !taken.is_empty() {
            return Err(UserError::LoginTaken(login.to_string()).into());
        }
        let user = self
            .users
            .create(|id, now| User::new(id, login, name, email, now))?;
        let event = UserCreated::from(&user);
        Ok(Emitted::new(user, event))
    }

    pub fn update_user(&self, user_id: Uuid, name: &str, email: &str) -> Result<Emitted<User>> {
        let change = self.users.update(user_id, |user| {
            user.name = name.to_string();
            user.email = email.to_string();
            Ok(())
        })?;
        let event = UserUpdated::from(&change.after);
        Ok(Emitted::new(change.after, event))
    }

    pub fn delete_user(&self, user_id: Uuid) -> Result<Emitted<User>> {
        let user = self.users.delete(user_id)?;
        Ok(Emitted::new(user, UserDeleted { user_id }))
    }
}

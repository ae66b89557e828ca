use std::sync::Arc;

use ifrof_security::Caller;
use marketplace_sdk::{NewUser, Role, User};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::{FactoriesRepository, UsersRepository};

pub struct UsersService {
    repo: Arc<dyn UsersRepository>,
    factories: Arc<dyn FactoriesRepository>,
}

impl UsersService {
    pub fn new(repo: Arc<dyn UsersRepository>, factories: Arc<dyn FactoriesRepository>) -> Self {
        Self { repo, factories }
    }

    /// The caller's own record; `None` when it vanished since the session was resolved.
    pub async fn me(&self, caller: &Caller) -> Result<Option<User>, DomainError> {
        self.repo.get(caller.id()).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.repo.get(id).await
    }

    async fn ensure_membership(
        &self,
        role: Role,
        factory_id: Option<Uuid>,
    ) -> Result<(), DomainError> {
        match factory_id {
            Some(_) if role != Role::Factory => Err(DomainError::validation(
                "factoryId",
                "only factory users can belong to a factory",
            )),
            Some(id) => {
                if self.factories.get(id).await?.is_none() {
                    return Err(DomainError::not_found("Factory", id));
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    #[instrument(skip(self, user), fields(role = %user.role))]
    pub async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        self.ensure_membership(user.role, user.factory_id).await?;
        let created = self.repo.create(user).await?;
        info!(user_id = %created.id, "Created user");
        Ok(created)
    }

    /// Administrative role change.
    #[instrument(skip(self), fields(user_id = %user_id, role = %role))]
    pub async fn update_role(
        &self,
        user_id: Uuid,
        role: Role,
        factory_id: Option<Uuid>,
    ) -> Result<User, DomainError> {
        self.ensure_membership(role, factory_id).await?;
        let updated = self
            .repo
            .update_role(user_id, role, factory_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        info!("Changed user role");
        Ok(updated)
    }

    pub async fn record_sign_in(&self, user_id: Uuid) -> Result<(), DomainError> {
        self.repo.touch_signed_in(user_id).await
    }
}

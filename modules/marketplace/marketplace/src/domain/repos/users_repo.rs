use async_trait::async_trait;
use marketplace_sdk::{NewUser, Role, User};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Repository trait for user accounts.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Change role and factory membership. `Ok(None)` when the user is missing.
    async fn update_role(
        &self,
        id: Uuid,
        role: Role,
        factory_id: Option<Uuid>,
    ) -> Result<Option<User>, DomainError>;

    /// Users acting for `factory_id`.
    async fn list_by_factory(&self, factory_id: Uuid) -> Result<Vec<User>, DomainError>;

    async fn touch_signed_in(&self, id: Uuid) -> Result<(), DomainError>;
}

use async_trait::async_trait;
use marketplace_sdk::{Factory, FactoryPatch, NewFactory};
use uuid::Uuid;

use crate::domain::error::DomainError;

#[async_trait]
pub trait FactoriesRepository: Send + Sync {
    /// All factories, newest first.
    async fn list(&self) -> Result<Vec<Factory>, DomainError>;

    async fn get(&self, id: Uuid) -> Result<Option<Factory>, DomainError>;

    /// Case-insensitive substring match on name, description and location.
    async fn search(&self, query: &str) -> Result<Vec<Factory>, DomainError>;

    async fn create(&self, factory: NewFactory) -> Result<Factory, DomainError>;

    async fn update(&self, id: Uuid, patch: FactoryPatch) -> Result<Option<Factory>, DomainError>;
}

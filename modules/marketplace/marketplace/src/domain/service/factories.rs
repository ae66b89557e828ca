use std::sync::Arc;

use marketplace_sdk::{Factory, FactoryPatch, NewFactory};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::FactoriesRepository;

pub struct FactoriesService {
    repo: Arc<dyn FactoriesRepository>,
}

impl FactoriesService {
    pub fn new(repo: Arc<dyn FactoriesRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Factory>, DomainError> {
        self.repo.list().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Factory>, DomainError> {
        self.repo.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Factory>, DomainError> {
        let found = self.repo.search(query.trim()).await?;
        debug!(matches = found.len(), "Searched factories");
        Ok(found)
    }

    #[instrument(skip(self, factory), fields(name = %factory.name))]
    pub async fn create(&self, factory: NewFactory) -> Result<Factory, DomainError> {
        let created = self.repo.create(factory).await?;
        info!(factory_id = %created.id, "Created factory");
        Ok(created)
    }

    /// `None` when the factory does not exist; absence is not an error here.
    #[instrument(skip(self, patch), fields(factory_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        patch: FactoryPatch,
    ) -> Result<Option<Factory>, DomainError> {
        self.repo.update(id, patch).await
    }
}

use std::sync::Arc;

use marketplace_sdk::{NewProduct, Product, ProductPatch};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::{FactoriesRepository, ProductFilter, ProductsRepository};

pub struct ProductsService {
    repo: Arc<dyn ProductsRepository>,
    factories: Arc<dyn FactoriesRepository>,
}

impl ProductsService {
    pub fn new(repo: Arc<dyn ProductsRepository>, factories: Arc<dyn FactoriesRepository>) -> Self {
        Self { repo, factories }
    }

    pub async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, DomainError> {
        self.repo.list(filter).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.repo.get(id).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Product>, DomainError> {
        self.repo.search(query.trim()).await
    }

    #[instrument(
        skip(self, product),
        fields(factory_id = %product.factory_id, name = %product.name)
    )]
    pub async fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        if self.factories.get(product.factory_id).await?.is_none() {
            return Err(DomainError::not_found("Factory", product.factory_id));
        }
        let created = self.repo.create(product).await?;
        info!(product_id = %created.id, "Created product");
        Ok(created)
    }

    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<Option<Product>, DomainError> {
        self.repo.update(id, patch).await
    }
}

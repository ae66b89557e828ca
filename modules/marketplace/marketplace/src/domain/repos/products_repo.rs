use async_trait::async_trait;
use marketplace_sdk::{NewProduct, Product, ProductPatch};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Optional filters of `products.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub factory_id: Option<Uuid>,
    pub category: Option<String>,
}

#[async_trait]
pub trait ProductsRepository: Send + Sync {
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, DomainError>;

    async fn get(&self, id: Uuid) -> Result<Option<Product>, DomainError>;

    /// Case-insensitive substring match on name, description and category.
    async fn search(&self, query: &str) -> Result<Vec<Product>, DomainError>;

    async fn create(&self, product: NewProduct) -> Result<Product, DomainError>;

    async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, DomainError>;
}

use async_trait::async_trait;
use marketplace_sdk::{NewOrder, Order, OrderStatus};
use uuid::Uuid;

use crate::domain::error::DomainError;

#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Persist a new order with status `pending`.
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError>;

    async fn get(&self, id: Uuid) -> Result<Option<Order>, DomainError>;

    /// Newest first.
    async fn list_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError>;

    /// Newest first, optionally restricted to one status.
    async fn list_by_factory(
        &self,
        factory_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, DomainError>;
}

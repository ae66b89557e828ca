use async_trait::async_trait;
use marketplace_sdk::{Inquiry, InquiryStatus, NewInquiry};
use uuid::Uuid;

use crate::domain::error::DomainError;

#[async_trait]
pub trait InquiriesRepository: Send + Sync {
    async fn create(&self, inquiry: NewInquiry) -> Result<Inquiry, DomainError>;

    async fn get(&self, id: Uuid) -> Result<Option<Inquiry>, DomainError>;

    /// Newest first.
    async fn list_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Inquiry>, DomainError>;

    /// Newest first.
    async fn list_by_factory(&self, factory_id: Uuid) -> Result<Vec<Inquiry>, DomainError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: InquiryStatus,
    ) -> Result<Option<Inquiry>, DomainError>;
}

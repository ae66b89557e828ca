use async_trait::async_trait;
use marketplace_sdk::{NewNotification, Notification};
use uuid::Uuid;

use crate::domain::error::DomainError;

#[async_trait]
pub trait NotificationsRepository: Send + Sync {
    async fn create(&self, notification: NewNotification) -> Result<Notification, DomainError>;

    /// Newest first, at most `limit` entries.
    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: u64,
    ) -> Result<Vec<Notification>, DomainError>;

    async fn unread_count(&self, user_id: Uuid) -> Result<u64, DomainError>;

    /// Mark one notification of `user_id` read. Returns whether it matched.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, DomainError>;

    /// Returns the number of notifications that changed.
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, DomainError>;
}

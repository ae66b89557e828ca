use std::sync::Arc;

use ifrof_security::Caller;
use marketplace_sdk::{NewNotification, Notification};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::NotificationsRepository;

pub struct NotificationsService {
    repo: Arc<dyn NotificationsRepository>,
    page_size: u64,
}

impl NotificationsService {
    pub fn new(repo: Arc<dyn NotificationsRepository>, page_size: u64) -> Self {
        Self { repo, page_size }
    }

    #[instrument(
        skip(self, notification),
        fields(user_id = %notification.user_id, kind = %notification.kind)
    )]
    pub async fn create(&self, notification: NewNotification) -> Result<Notification, DomainError> {
        debug!("Creating notification");
        self.repo.create(notification).await
    }

    /// Side-effect notification of another mutation. Failures are logged and
    /// never fail the calling procedure.
    pub async fn notify_best_effort(&self, notification: NewNotification) {
        let user_id = notification.user_id;
        if let Err(e) = self.repo.create(notification).await {
            warn!(%user_id, error = %e, "Notification dispatch failed (continuing)");
        }
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.id()))]
    pub async fn list(
        &self,
        caller: &Caller,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError> {
        self.repo
            .list(caller.id(), unread_only, self.page_size)
            .await
    }

    pub async fn unread_count(&self, caller: &Caller) -> Result<u64, DomainError> {
        self.repo.unread_count(caller.id()).await
    }

    /// A notification that does not exist or belongs to someone else is
    /// reported as missing, never as an authorization failure.
    #[instrument(skip(self, caller), fields(user_id = %caller.id(), notification_id = %id))]
    pub async fn mark_as_read(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        if self.repo.mark_read(id, caller.id()).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("Notification", id))
        }
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.id()))]
    pub async fn mark_all_as_read(&self, caller: &Caller) -> Result<u64, DomainError> {
        let changed = self.repo.mark_all_read(caller.id()).await?;
        debug!(changed, "Marked notifications read");
        Ok(changed)
    }
}

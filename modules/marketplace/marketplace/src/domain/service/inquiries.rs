use std::sync::Arc;

use ifrof_security::Caller;
use marketplace_sdk::{Inquiry, InquiryStatus, NewInquiry, NewNotification, NotificationType};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::{InquiriesRepository, UsersRepository};
use crate::domain::service::NotificationsService;

pub struct InquiriesService {
    repo: Arc<dyn InquiriesRepository>,
    users: Arc<dyn UsersRepository>,
    notifications: Arc<NotificationsService>,
}

fn ensure_factory_access(caller: &Caller, factory_id: Uuid) -> Result<(), DomainError> {
    if caller.is_admin() || caller.acts_for_factory(factory_id) {
        Ok(())
    } else {
        Err(DomainError::forbidden("not a member of this factory"))
    }
}

impl InquiriesService {
    pub fn new(
        repo: Arc<dyn InquiriesRepository>,
        users: Arc<dyn UsersRepository>,
        notifications: Arc<NotificationsService>,
    ) -> Self {
        Self {
            repo,
            users,
            notifications,
        }
    }

    /// The buyer is always the caller, whatever the payload claimed.
    #[instrument(
        skip(self, caller, subject, description),
        fields(buyer_id = %caller.id(), factory_id = %factory_id)
    )]
    pub async fn create(
        &self,
        caller: &Caller,
        factory_id: Uuid,
        subject: String,
        description: String,
    ) -> Result<Inquiry, DomainError> {
        let inquiry = self
            .repo
            .create(NewInquiry {
                buyer_id: caller.id(),
                factory_id,
                subject,
                description,
            })
            .await?;
        info!(inquiry_id = %inquiry.id, "Created inquiry");

        match self.users.list_by_factory(factory_id).await {
            Ok(members) => {
                for member in members {
                    self.notifications
                        .notify_best_effort(NewNotification {
                            user_id: member.id,
                            kind: NotificationType::Inquiry,
                            title: "New inquiry".to_owned(),
                            message: inquiry.subject.clone(),
                            link: Some(format!("/inquiries/{}", inquiry.id)),
                        })
                        .await;
                }
            }
            Err(e) => warn!(error = %e, "Could not resolve factory members for notification"),
        }

        Ok(inquiry)
    }

    pub async fn get_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Inquiry>, DomainError> {
        self.repo.list_by_buyer(buyer_id).await
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.id(), factory_id = %factory_id))]
    pub async fn get_by_factory(
        &self,
        caller: &Caller,
        factory_id: Uuid,
    ) -> Result<Vec<Inquiry>, DomainError> {
        ensure_factory_access(caller, factory_id)?;
        self.repo.list_by_factory(factory_id).await
    }

    #[instrument(
        skip(self, caller),
        fields(user_id = %caller.id(), inquiry_id = %id, status = %status)
    )]
    pub async fn update_status(
        &self,
        caller: &Caller,
        id: Uuid,
        status: InquiryStatus,
    ) -> Result<Inquiry, DomainError> {
        let existing = self
            .repo
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Inquiry", id))?;
        ensure_factory_access(caller, existing.factory_id)?;

        let updated = self
            .repo
            .update_status(id, status)
            .await?
            .ok_or_else(|| DomainError::not_found("Inquiry", id))?;
        info!("Updated inquiry status");

        self.notifications
            .notify_best_effort(NewNotification {
                user_id: updated.buyer_id,
                kind: NotificationType::Inquiry,
                title: "Inquiry updated".to_owned(),
                message: format!("Your inquiry \"{}\" is now {status}", updated.subject),
                link: Some(format!("/inquiries/{id}")),
            })
            .await;

        Ok(updated)
    }
}

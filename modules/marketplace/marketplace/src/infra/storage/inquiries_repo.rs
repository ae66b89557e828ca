use async_trait::async_trait;
use marketplace_sdk::{Inquiry, InquiryStatus, NewInquiry};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::db_err;
use super::entity::inquiry;
use super::mapper::try_collect;
use crate::domain::error::DomainError;
use crate::domain::repos::InquiriesRepository;

/// `SeaORM` implementation of `InquiriesRepository`.
pub struct SeaOrmInquiriesRepository {
    db: DatabaseConnection,
}

impl SeaOrmInquiriesRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn list_where(
        &self,
        column: inquiry::Column,
        id: Uuid,
    ) -> Result<Vec<Inquiry>, DomainError> {
        let rows = inquiry::Entity::find()
            .filter(column.eq(id))
            .order_by_desc(inquiry::Column::CreatedAt)
            .order_by_desc(inquiry::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }
}

#[async_trait]
impl InquiriesRepository for SeaOrmInquiriesRepository {
    async fn create(&self, new_inquiry: NewInquiry) -> Result<Inquiry, DomainError> {
        let now = OffsetDateTime::now_utc();
        let model = inquiry::ActiveModel {
            id: Set(Uuid::now_v7()),
            buyer_id: Set(new_inquiry.buyer_id),
            factory_id: Set(new_inquiry.factory_id),
            subject: Set(new_inquiry.subject),
            description: Set(new_inquiry.description),
            status: Set(InquiryStatus::Pending.as_str().to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        Inquiry::try_from(model)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Inquiry>, DomainError> {
        inquiry::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(Inquiry::try_from)
            .transpose()
    }

    async fn list_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Inquiry>, DomainError> {
        self.list_where(inquiry::Column::BuyerId, buyer_id).await
    }

    async fn list_by_factory(&self, factory_id: Uuid) -> Result<Vec<Inquiry>, DomainError> {
        self.list_where(inquiry::Column::FactoryId, factory_id).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: InquiryStatus,
    ) -> Result<Option<Inquiry>, DomainError> {
        let Some(existing) = inquiry::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let mut active: inquiry::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_owned());
        active.updated_at = Set(OffsetDateTime::now_utc());
        let model = active.update(&self.db).await.map_err(db_err)?;
        Inquiry::try_from(model).map(Some)
    }
}

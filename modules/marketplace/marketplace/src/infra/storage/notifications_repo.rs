use async_trait::async_trait;
use marketplace_sdk::{NewNotification, Notification};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::db_err;
use super::entity::notification;
use super::mapper::try_collect;
use crate::domain::error::DomainError;
use crate::domain::repos::NotificationsRepository;

/// `SeaORM` implementation of `NotificationsRepository`.
pub struct SeaOrmNotificationsRepository {
    db: DatabaseConnection,
}

impl SeaOrmNotificationsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationsRepository for SeaOrmNotificationsRepository {
    async fn create(&self, new: NewNotification) -> Result<Notification, DomainError> {
        let model = notification::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(new.user_id),
            kind: Set(new.kind.as_str().to_owned()),
            title: Set(new.title),
            message: Set(new.message),
            link: Set(new.link),
            is_read: Set(false),
            created_at: Set(OffsetDateTime::now_utc()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        Notification::try_from(model)
    }

    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: u64,
    ) -> Result<Vec<Notification>, DomainError> {
        let mut query =
            notification::Entity::find().filter(notification::Column::UserId.eq(user_id));
        if unread_only {
            query = query.filter(notification::Column::IsRead.eq(false));
        }
        let rows = query
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<u64, DomainError> {
        notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        // Re-marking an already read notification still matches the row.
        let matched = notification::Entity::find()
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        if matched == 0 {
            return Ok(false);
        }
        notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(true)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }
}

use async_trait::async_trait;
use marketplace_sdk::{NewUser, Role, User};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::db_err;
use super::entity::user;
use super::mapper::try_collect;
use crate::domain::error::DomainError;
use crate::domain::repos::UsersRepository;

/// `SeaORM` implementation of `UsersRepository`.
pub struct SeaOrmUsersRepository {
    db: DatabaseConnection,
}

impl SeaOrmUsersRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    async fn get(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(User::try_from)
            .transpose()
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let now = OffsetDateTime::now_utc();
        let model = user::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            role: Set(new_user.role.as_str().to_owned()),
            factory_id: Set(new_user.factory_id),
            created_at: Set(now),
            updated_at: Set(now),
            last_signed_in: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        User::try_from(model)
    }

    async fn update_role(
        &self,
        id: Uuid,
        role: Role,
        factory_id: Option<Uuid>,
    ) -> Result<Option<User>, DomainError> {
        let Some(existing) = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();
        active.role = Set(role.as_str().to_owned());
        active.factory_id = Set(factory_id);
        active.updated_at = Set(OffsetDateTime::now_utc());
        let model = active.update(&self.db).await.map_err(db_err)?;
        User::try_from(model).map(Some)
    }

    async fn list_by_factory(&self, factory_id: Uuid) -> Result<Vec<User>, DomainError> {
        let rows = user::Entity::find()
            .filter(user::Column::FactoryId.eq(factory_id))
            .filter(user::Column::Role.eq(Role::Factory.as_str()))
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn touch_signed_in(&self, id: Uuid) -> Result<(), DomainError> {
        user::Entity::update_many()
            .col_expr(
                user::Column::LastSignedIn,
                Expr::value(Some(OffsetDateTime::now_utc())),
            )
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

use async_trait::async_trait;
use marketplace_sdk::{Factory, FactoryPatch, NewFactory};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::entity::factory;
use super::mapper::try_collect;
use super::{contains_ci, db_err};
use crate::domain::error::DomainError;
use crate::domain::repos::FactoriesRepository;

/// `SeaORM` implementation of `FactoriesRepository`.
pub struct SeaOrmFactoriesRepository {
    db: DatabaseConnection,
}

impl SeaOrmFactoriesRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FactoriesRepository for SeaOrmFactoriesRepository {
    async fn list(&self) -> Result<Vec<Factory>, DomainError> {
        let rows = factory::Entity::find()
            .order_by_desc(factory::Column::CreatedAt)
            .order_by_desc(factory::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Factory>, DomainError> {
        factory::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(Factory::try_from)
            .transpose()
    }

    async fn search(&self, query: &str) -> Result<Vec<Factory>, DomainError> {
        let rows = factory::Entity::find()
            .filter(
                Condition::any()
                    .add(contains_ci(factory::Column::Name, query))
                    .add(contains_ci(factory::Column::Description, query))
                    .add(contains_ci(factory::Column::Location, query)),
            )
            .order_by_desc(factory::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn create(&self, new_factory: NewFactory) -> Result<Factory, DomainError> {
        let now = OffsetDateTime::now_utc();
        let model = factory::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(new_factory.name),
            description: Set(new_factory.description),
            location: Set(new_factory.location),
            contact_email: Set(new_factory.contact_email),
            contact_phone: Set(new_factory.contact_phone),
            verification_status: Set(new_factory.verification_status.as_str().to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        Factory::try_from(model)
    }

    async fn update(&self, id: Uuid, patch: FactoryPatch) -> Result<Option<Factory>, DomainError> {
        let Some(existing) = factory::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: factory::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(location) = patch.location {
            active.location = Set(Some(location));
        }
        if let Some(email) = patch.contact_email {
            active.contact_email = Set(Some(email));
        }
        if let Some(phone) = patch.contact_phone {
            active.contact_phone = Set(Some(phone));
        }
        if let Some(status) = patch.verification_status {
            active.verification_status = Set(status.as_str().to_owned());
        }
        active.updated_at = Set(OffsetDateTime::now_utc());

        let model = active.update(&self.db).await.map_err(db_err)?;
        Factory::try_from(model).map(Some)
    }
}

use async_trait::async_trait;
use marketplace_sdk::{NewProduct, Product, ProductPatch};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::entity::product;
use super::mapper::try_collect;
use super::{contains_ci, db_err};
use crate::domain::error::DomainError;
use crate::domain::money::to_minor_units;
use crate::domain::repos::{ProductFilter, ProductsRepository};

/// `SeaORM` implementation of `ProductsRepository`.
pub struct SeaOrmProductsRepository {
    db: DatabaseConnection,
}

impl SeaOrmProductsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn price_minor(price: Decimal) -> Result<i64, DomainError> {
    to_minor_units(price).ok_or_else(|| DomainError::validation("price", "amount is out of range"))
}

fn quantity(value: u32) -> Result<i32, DomainError> {
    i32::try_from(value)
        .map_err(|_| DomainError::validation("minOrderQuantity", "value is out of range"))
}

#[async_trait]
impl ProductsRepository for SeaOrmProductsRepository {
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, DomainError> {
        let mut query = product::Entity::find();
        if let Some(factory_id) = filter.factory_id {
            query = query.filter(product::Column::FactoryId.eq(factory_id));
        }
        if let Some(category) = filter.category {
            query = query.filter(product::Column::Category.eq(category));
        }
        let rows = query
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        product::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(Product::try_from)
            .transpose()
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>, DomainError> {
        let rows = product::Entity::find()
            .filter(
                Condition::any()
                    .add(contains_ci(product::Column::Name, query))
                    .add(contains_ci(product::Column::Description, query))
                    .add(contains_ci(product::Column::Category, query)),
            )
            .order_by_desc(product::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn create(&self, new_product: NewProduct) -> Result<Product, DomainError> {
        let now = OffsetDateTime::now_utc();
        let model = product::ActiveModel {
            id: Set(Uuid::now_v7()),
            factory_id: Set(new_product.factory_id),
            name: Set(new_product.name),
            description: Set(new_product.description),
            category: Set(new_product.category),
            price_minor: Set(price_minor(new_product.price)?),
            min_order_quantity: Set(quantity(new_product.min_order_quantity)?),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        Product::try_from(model)
    }

    async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, DomainError> {
        let Some(existing) = product::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = patch.category {
            active.category = Set(Some(category));
        }
        if let Some(price) = patch.price {
            active.price_minor = Set(price_minor(price)?);
        }
        if let Some(min) = patch.min_order_quantity {
            active.min_order_quantity = Set(quantity(min)?);
        }
        active.updated_at = Set(OffsetDateTime::now_utc());

        let model = active.update(&self.db).await.map_err(db_err)?;
        Product::try_from(model).map(Some)
    }
}

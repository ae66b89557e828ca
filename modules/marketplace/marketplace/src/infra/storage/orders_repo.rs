use async_trait::async_trait;
use marketplace_sdk::{NewOrder, Order, OrderStatus};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::db_err;
use super::entity::order;
use super::mapper::{to_json, try_collect};
use crate::domain::error::DomainError;
use crate::domain::money::to_minor_units;
use crate::domain::repos::OrdersRepository;

/// `SeaORM` implementation of `OrdersRepository`.
pub struct SeaOrmOrdersRepository {
    db: DatabaseConnection,
}

impl SeaOrmOrdersRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrdersRepository for SeaOrmOrdersRepository {
    async fn create(&self, new_order: NewOrder) -> Result<Order, DomainError> {
        let total_minor = to_minor_units(new_order.total_amount)
            .ok_or_else(|| DomainError::validation("items", "order total is out of range"))?;
        let now = OffsetDateTime::now_utc();
        let model = order::ActiveModel {
            id: Set(Uuid::now_v7()),
            order_number: Set(new_order.order_number),
            buyer_id: Set(new_order.buyer_id),
            factory_id: Set(new_order.factory_id),
            items: Set(to_json("orders.items", &new_order.items)?),
            total_minor: Set(total_minor),
            currency: Set(new_order.currency),
            status: Set(OrderStatus::Pending.as_str().to_owned()),
            checkout_session_id: Set(new_order.checkout_session_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        Order::try_from(model)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        order::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(Order::try_from)
            .transpose()
    }

    async fn list_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let rows = order::Entity::find()
            .filter(order::Column::BuyerId.eq(buyer_id))
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn list_by_factory(
        &self,
        factory_id: Uuid,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut query = order::Entity::find().filter(order::Column::FactoryId.eq(factory_id));
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status.as_str()));
        }
        let rows = query
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, DomainError> {
        let Some(existing) = order::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let mut active: order::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_owned());
        active.updated_at = Set(OffsetDateTime::now_utc());
        let model = active.update(&self.db).await.map_err(db_err)?;
        Order::try_from(model).map(Some)
    }
}

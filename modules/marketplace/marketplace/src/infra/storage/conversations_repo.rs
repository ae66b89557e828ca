use async_trait::async_trait;
use marketplace_sdk::{Conversation, Message};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::db_err;
use super::entity::{conversation, message};
use crate::domain::error::DomainError;
use crate::domain::repos::ConversationsRepository;

/// `SeaORM` implementation of `ConversationsRepository`.
pub struct SeaOrmConversationsRepository {
    db: DatabaseConnection,
}

impl SeaOrmConversationsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_pair(
        &self,
        buyer_id: Uuid,
        factory_id: Uuid,
    ) -> Result<Option<conversation::Model>, DomainError> {
        conversation::Entity::find()
            .filter(conversation::Column::BuyerId.eq(buyer_id))
            .filter(conversation::Column::FactoryId.eq(factory_id))
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl ConversationsRepository for SeaOrmConversationsRepository {
    async fn find_or_create(
        &self,
        buyer_id: Uuid,
        factory_id: Uuid,
    ) -> Result<Conversation, DomainError> {
        if let Some(existing) = self.find_pair(buyer_id, factory_id).await? {
            return Ok(existing.into());
        }

        let now = OffsetDateTime::now_utc();
        let inserted = conversation::ActiveModel {
            id: Set(Uuid::now_v7()),
            buyer_id: Set(buyer_id),
            factory_id: Set(factory_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await;

        match inserted {
            Ok(model) => Ok(model.into()),
            // Lost a race against a concurrent insert of the same pair.
            Err(e) => match self.find_pair(buyer_id, factory_id).await? {
                Some(existing) => Ok(existing.into()),
                None => Err(db_err(e)),
            },
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, DomainError> {
        Ok(conversation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(Conversation::from))
    }

    async fn list_for(
        &self,
        user_id: Uuid,
        factory_id: Option<Uuid>,
    ) -> Result<Vec<Conversation>, DomainError> {
        let mut participant = Condition::any().add(conversation::Column::BuyerId.eq(user_id));
        if let Some(factory_id) = factory_id {
            participant = participant.add(conversation::Column::FactoryId.eq(factory_id));
        }
        let rows = conversation::Entity::find()
            .filter(participant)
            .order_by_desc(conversation::Column::UpdatedAt)
            .order_by_desc(conversation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Conversation::from).collect())
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, DomainError> {
        let rows = message::Entity::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(message::Column::CreatedAt)
            .order_by_asc(message::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn append_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<Message, DomainError> {
        let now = OffsetDateTime::now_utc();
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = message::ActiveModel {
            id: Set(Uuid::now_v7()),
            conversation_id: Set(conversation_id),
            sender_id: Set(sender_id),
            content: Set(content.to_owned()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        conversation::Entity::update_many()
            .col_expr(conversation::Column::UpdatedAt, Expr::value(now))
            .filter(conversation::Column::Id.eq(conversation_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(model.into())
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use marketplace_sdk::{ChatMessage, ChatRole, ChatSession};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::db_err;
use super::entity::chat_message;
use super::mapper::try_collect;
use crate::domain::error::DomainError;
use crate::domain::repos::ChatRepository;

/// `SeaORM` implementation of `ChatRepository`.
pub struct SeaOrmChatRepository {
    db: DatabaseConnection,
}

impl SeaOrmChatRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Groups a user's messages by session, most recently active first.
fn summarize(rows: &[chat_message::Model]) -> Vec<ChatSession> {
    let mut sessions: HashMap<&str, ChatSession> = HashMap::new();
    for row in rows {
        sessions
            .entry(row.session_id.as_str())
            .and_modify(|s| {
                s.message_count += 1;
                if row.created_at > s.last_message_at {
                    s.last_message_at = row.created_at;
                }
            })
            .or_insert_with(|| ChatSession {
                session_id: row.session_id.clone(),
                message_count: 1,
                last_message_at: row.created_at,
            });
    }
    let mut sessions: Vec<ChatSession> = sessions.into_values().collect();
    sessions.sort_by(|a, b| {
        b.last_message_at
            .cmp(&a.last_message_at)
            .then_with(|| a.session_id.cmp(&b.session_id))
    });
    sessions
}

#[async_trait]
impl ChatRepository for SeaOrmChatRepository {
    async fn append(
        &self,
        user_id: Uuid,
        session_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<ChatMessage, DomainError> {
        let model = chat_message::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            session_id: Set(session_id.to_owned()),
            role: Set(role.as_str().to_owned()),
            content: Set(content.to_owned()),
            created_at: Set(OffsetDateTime::now_utc()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        ChatMessage::try_from(model)
    }

    async fn history(
        &self,
        user_id: Uuid,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, DomainError> {
        let rows = chat_message::Entity::find()
            .filter(chat_message::Column::UserId.eq(user_id))
            .filter(chat_message::Column::SessionId.eq(session_id))
            .order_by_asc(chat_message::Column::CreatedAt)
            .order_by_asc(chat_message::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn sessions(&self, user_id: Uuid) -> Result<Vec<ChatSession>, DomainError> {
        let rows = chat_message::Entity::find()
            .filter(chat_message::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(summarize(&rows))
    }

    async fn clear(&self, user_id: Uuid, session_id: &str) -> Result<u64, DomainError> {
        let result = chat_message::Entity::delete_many()
            .filter(chat_message::Column::UserId.eq(user_id))
            .filter(chat_message::Column::SessionId.eq(session_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use time::Duration;

    use super::*;

    fn row(session: &str, at: OffsetDateTime) -> chat_message::Model {
        chat_message::Model {
            id: Uuid::now_v7(),
            user_id: Uuid::nil(),
            session_id: session.to_owned(),
            role: "user".to_owned(),
            content: "hi".to_owned(),
            created_at: at,
        }
    }

    #[test]
    fn sessions_are_counted_and_ordered_by_activity() {
        let t0 = OffsetDateTime::now_utc();
        let rows = vec![
            row("a", t0),
            row("b", t0 + Duration::seconds(5)),
            row("a", t0 + Duration::seconds(10)),
        ];
        let sessions = summarize(&rows);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, "a");
        assert_eq!(sessions[0].message_count, 2);
        assert_eq!(sessions[0].last_message_at, t0 + Duration::seconds(10));
        assert_eq!(sessions[1].session_id, "b");
    }
}

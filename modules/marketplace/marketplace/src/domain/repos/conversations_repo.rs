use async_trait::async_trait;
use marketplace_sdk::{Conversation, Message};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Buyer/factory conversation threads and their messages.
#[async_trait]
pub trait ConversationsRepository: Send + Sync {
    /// Existing conversation of the pair, or a newly created one.
    async fn find_or_create(
        &self,
        buyer_id: Uuid,
        factory_id: Uuid,
    ) -> Result<Conversation, DomainError>;

    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, DomainError>;

    /// Conversations where the user is the buyer or, when given, the factory
    /// side. Most recently active first.
    async fn list_for(
        &self,
        user_id: Uuid,
        factory_id: Option<Uuid>,
    ) -> Result<Vec<Conversation>, DomainError>;

    /// Oldest first.
    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, DomainError>;

    /// Persist a message and bump the conversation's activity time.
    async fn append_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<Message, DomainError>;
}

use async_trait::async_trait;
use marketplace_sdk::{ChatMessage, ChatRole, ChatSession};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Chatbot session logs, always scoped to the owning user.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn append(
        &self,
        user_id: Uuid,
        session_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<ChatMessage, DomainError>;

    /// Oldest first.
    async fn history(&self, user_id: Uuid, session_id: &str)
    -> Result<Vec<ChatMessage>, DomainError>;

    /// Most recently active first.
    async fn sessions(&self, user_id: Uuid) -> Result<Vec<ChatSession>, DomainError>;

    /// Returns the number of deleted messages.
    async fn clear(&self, user_id: Uuid, session_id: &str) -> Result<u64, DomainError>;
}

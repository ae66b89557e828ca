use std::sync::Arc;

use ifrof_security::Caller;
use marketplace_sdk::{ChatMessage, ChatRole, ChatSession, Language};
use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::ports::{ChatCompletion, ChatTurn};
use crate::domain::repos::ChatRepository;

pub struct ChatbotService {
    repo: Arc<dyn ChatRepository>,
    ai: Arc<dyn ChatCompletion>,
}

impl ChatbotService {
    pub fn new(repo: Arc<dyn ChatRepository>, ai: Arc<dyn ChatCompletion>) -> Self {
        Self { repo, ai }
    }

    /// Stores the user's message, asks the assistant with the whole session
    /// as context and stores the reply.
    ///
    /// When the completion fails the user's message stays in the log.
    #[instrument(
        skip(self, caller, message),
        fields(user_id = %caller.id(), session_id = %session_id, language = %language)
    )]
    pub async fn send_message(
        &self,
        caller: &Caller,
        session_id: &str,
        message: &str,
        language: Language,
    ) -> Result<String, DomainError> {
        self.repo
            .append(caller.id(), session_id, ChatRole::User, message)
            .await?;

        let turns: Vec<ChatTurn> = self
            .repo
            .history(caller.id(), session_id)
            .await?
            .into_iter()
            .map(|m| ChatTurn::new(m.role, m.content))
            .collect();
        debug!(turns = turns.len(), "Requesting completion");

        let reply = self.ai.complete(language, &turns).await?;
        self.repo
            .append(caller.id(), session_id, ChatRole::Assistant, &reply)
            .await?;
        Ok(reply)
    }

    pub async fn get_history(
        &self,
        caller: &Caller,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, DomainError> {
        self.repo.history(caller.id(), session_id).await
    }

    pub async fn get_sessions(&self, caller: &Caller) -> Result<Vec<ChatSession>, DomainError> {
        self.repo.sessions(caller.id()).await
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.id(), session_id = %session_id))]
    pub async fn clear_history(
        &self,
        caller: &Caller,
        session_id: &str,
    ) -> Result<(), DomainError> {
        let removed = self.repo.clear(caller.id(), session_id).await?;
        debug!(removed, "Cleared chat session");
        Ok(())
    }

    /// Stateless completion used by the `/api/chat` endpoint.
    pub async fn complete(
        &self,
        language: Language,
        turns: &[ChatTurn],
    ) -> Result<String, DomainError> {
        Ok(self.ai.complete(language, turns).await?)
    }
}

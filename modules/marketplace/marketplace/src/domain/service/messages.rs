use std::sync::Arc;

use ifrof_security::Caller;
use marketplace_sdk::{Conversation, Message};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::ports::MessagePublisher;
use crate::domain::repos::{ConversationsRepository, FactoriesRepository};

pub struct MessagesService {
    repo: Arc<dyn ConversationsRepository>,
    factories: Arc<dyn FactoriesRepository>,
    feed: Arc<dyn MessagePublisher>,
}

fn is_participant(caller: &Caller, conversation: &Conversation) -> bool {
    conversation.buyer_id == caller.id() || caller.acts_for_factory(conversation.factory_id)
}

impl MessagesService {
    pub fn new(
        repo: Arc<dyn ConversationsRepository>,
        factories: Arc<dyn FactoriesRepository>,
        feed: Arc<dyn MessagePublisher>,
    ) -> Self {
        Self {
            repo,
            factories,
            feed,
        }
    }

    /// Existing thread between the caller and the factory, or a new one.
    #[instrument(skip(self, caller), fields(user_id = %caller.id(), factory_id = %factory_id))]
    pub async fn start_conversation(
        &self,
        caller: &Caller,
        factory_id: Uuid,
    ) -> Result<Conversation, DomainError> {
        if self.factories.get(factory_id).await?.is_none() {
            return Err(DomainError::not_found("Factory", factory_id));
        }
        if caller.acts_for_factory(factory_id) {
            return Err(DomainError::validation(
                "factoryId",
                "cannot start a conversation with your own factory",
            ));
        }
        let conversation = self.repo.find_or_create(caller.id(), factory_id).await?;
        debug!(conversation_id = %conversation.id, "Conversation ready");
        Ok(conversation)
    }

    pub async fn list_conversations(
        &self,
        caller: &Caller,
    ) -> Result<Vec<Conversation>, DomainError> {
        self.repo.list_for(caller.id(), caller.factory_id()).await
    }

    /// Loads the conversation and checks that the caller takes part in it.
    #[instrument(skip(self, caller), fields(user_id = %caller.id()))]
    pub async fn authorize(
        &self,
        caller: &Caller,
        conversation_id: Uuid,
    ) -> Result<Conversation, DomainError> {
        let conversation = self
            .repo
            .get(conversation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Conversation", conversation_id))?;
        if !is_participant(caller, &conversation) {
            return Err(DomainError::forbidden("not a participant of this conversation"));
        }
        Ok(conversation)
    }

    pub async fn list(
        &self,
        caller: &Caller,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, DomainError> {
        self.authorize(caller, conversation_id).await?;
        self.repo.list_messages(conversation_id).await
    }

    /// Persists the message, then pushes it to live subscribers of the thread.
    #[instrument(
        skip(self, caller, content),
        fields(user_id = %caller.id(), conversation_id = %conversation_id)
    )]
    pub async fn send(
        &self,
        caller: &Caller,
        conversation_id: Uuid,
        content: &str,
    ) -> Result<Message, DomainError> {
        self.authorize(caller, conversation_id).await?;
        let message = self
            .repo
            .append_message(conversation_id, caller.id(), content)
            .await?;
        self.feed.publish(&message);
        info!(message_id = %message.id, "Message sent");
        Ok(message)
    }
}

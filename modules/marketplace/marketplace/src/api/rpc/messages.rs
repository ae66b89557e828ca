use std::sync::Arc;

use ifrof_rpc::{CallContext, NoInput, ProcedureBuilder, ProcedureRegistry, RegistryError, RpcError};
use marketplace_sdk::{Conversation, Message};

use super::bind;
use super::dto::{ConversationIdInput, FactoryIdInput, SendMessageInput};
use crate::domain::service::AppServices;

pub(super) fn register(
    registry: &mut ProcedureRegistry,
    services: &Arc<AppServices>,
) -> Result<(), RegistryError> {
    ProcedureBuilder::<FactoryIdInput, Conversation>::mutation("messages.startConversation")
        .summary("Existing or new conversation between the caller and a factory")
        .authenticated()
        .handler(bind(services, start_conversation))
        .register(registry)?;

    ProcedureBuilder::<NoInput, Vec<Conversation>>::query("messages.listConversations")
        .authenticated()
        .handler(bind(services, list_conversations))
        .register(registry)?;

    ProcedureBuilder::<ConversationIdInput, Vec<Message>>::query("messages.list")
        .summary("Messages of a conversation, oldest first; participants only")
        .authenticated()
        .handler(bind(services, list))
        .register(registry)?;

    ProcedureBuilder::<SendMessageInput, Message>::mutation("messages.send")
        .summary("Post to a conversation and push the message to live subscribers")
        .authenticated()
        .handler(bind(services, send))
        .register(registry)
}

async fn start_conversation(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: FactoryIdInput,
) -> Result<Conversation, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc
        .messages
        .start_conversation(caller, input.factory_id)
        .await?)
}

async fn list_conversations(
    svc: Arc<AppServices>,
    ctx: CallContext,
    _: NoInput,
) -> Result<Vec<Conversation>, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc.messages.list_conversations(caller).await?)
}

async fn list(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: ConversationIdInput,
) -> Result<Vec<Message>, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc.messages.list(caller, input.conversation_id).await?)
}

async fn send(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: SendMessageInput,
) -> Result<Message, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc
        .messages
        .send(caller, input.conversation_id, input.content.trim())
        .await?)
}

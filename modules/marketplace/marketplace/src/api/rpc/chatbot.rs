use std::sync::Arc;

use ifrof_rpc::{
    CallContext, NoInput, ProcedureBuilder, ProcedureRegistry, RegistryError, RpcError, Success,
};
use marketplace_sdk::{ChatMessage, ChatSession};

use super::bind;
use super::dto::{ChatReply, ChatSessionInput, SendChatInput};
use crate::domain::service::AppServices;

pub(super) fn register(
    registry: &mut ProcedureRegistry,
    services: &Arc<AppServices>,
) -> Result<(), RegistryError> {
    ProcedureBuilder::<SendChatInput, ChatReply>::mutation("chatbot.sendMessage")
        .summary("Ask the assistant within a session; the reply is stored with the history")
        .authenticated()
        .handler(bind(services, send_message))
        .register(registry)?;

    ProcedureBuilder::<ChatSessionInput, Vec<ChatMessage>>::query("chatbot.getHistory")
        .authenticated()
        .handler(bind(services, get_history))
        .register(registry)?;

    ProcedureBuilder::<NoInput, Vec<ChatSession>>::query("chatbot.getSessions")
        .authenticated()
        .handler(bind(services, get_sessions))
        .register(registry)?;

    ProcedureBuilder::<ChatSessionInput, Success>::mutation("chatbot.clearHistory")
        .authenticated()
        .handler(bind(services, clear_history))
        .register(registry)
}

async fn send_message(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: SendChatInput,
) -> Result<ChatReply, RpcError> {
    let caller = ctx.require_caller()?;
    let response = svc
        .chatbot
        .send_message(
            caller,
            input.session_id.trim(),
            input.message.trim(),
            input.language,
        )
        .await?;
    Ok(ChatReply { response })
}

async fn get_history(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: ChatSessionInput,
) -> Result<Vec<ChatMessage>, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc
        .chatbot
        .get_history(caller, input.session_id.trim())
        .await?)
}

async fn get_sessions(
    svc: Arc<AppServices>,
    ctx: CallContext,
    _: NoInput,
) -> Result<Vec<ChatSession>, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc.chatbot.get_sessions(caller).await?)
}

async fn clear_history(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: ChatSessionInput,
) -> Result<Success, RpcError> {
    let caller = ctx.require_caller()?;
    svc.chatbot
        .clear_history(caller, input.session_id.trim())
        .await?;
    Ok(Success::OK)
}

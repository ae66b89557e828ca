//! `GET /rpc/subscribe/messages/{conversationId}`: Server-Sent Events feed of
//! new messages in one conversation, for its participants.

use std::convert::Infallible;
use std::sync::Arc;

use axum::Extension;
use axum::extract::Path;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use ifrof_rpc::{CallContext, RpcError};
use tokio_stream::StreamExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::service::AppServices;
use crate::infra::realtime::MessageFeed;

pub const EVENT_NAME: &str = "message";

pub async fn subscribe_messages(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(feed): Extension<Arc<MessageFeed>>,
    ctx: Option<Extension<CallContext>>,
    Path(conversation_id): Path<Uuid>,
) -> Response {
    let instance = format!("/rpc/subscribe/messages/{conversation_id}");
    let ctx = ctx.map_or_else(CallContext::anonymous, |Extension(c)| c);

    let caller = match ctx.require_caller() {
        Ok(caller) => caller,
        Err(e) => return RpcError::from(e).to_problem(&instance).into_response(),
    };
    if let Err(e) = services.messages.authorize(caller, conversation_id).await {
        return RpcError::from(e).to_problem(&instance).into_response();
    }

    info!(%conversation_id, caller_id = %caller.id(), "Opened message feed");
    let events = feed.subscribe(conversation_id).filter_map(move |message| {
        match Event::default().event(EVENT_NAME).json_data(&message) {
            Ok(event) => Some(Ok::<_, Infallible>(event)),
            Err(e) => {
                warn!(message_id = %message.id, error = %e, "Skipping unencodable message");
                None
            }
        }
    });
    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

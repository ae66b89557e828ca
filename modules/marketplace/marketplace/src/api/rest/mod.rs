//! Plain HTTP routes next to the procedure surface.

pub mod chat;
pub mod subscribe;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::domain::service::AppServices;
use crate::infra::realtime::MessageFeed;

pub fn routes<S>(services: Arc<AppServices>, feed: Arc<MessageFeed>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/api/chat", post(chat::chat))
        .route(
            "/rpc/subscribe/messages/{conversation_id}",
            get(subscribe::subscribe_messages),
        )
        .layer(Extension(services))
        .layer(Extension(feed))
}

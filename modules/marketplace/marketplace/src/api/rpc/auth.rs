use std::sync::Arc;

use ifrof_rpc::{
    CallContext, NoInput, ProcedureBuilder, ProcedureRegistry, RegistryError, RpcError, Success,
};
use marketplace_sdk::User;
use tracing::info;

use super::bind;
use crate::domain::service::AppServices;

pub(super) fn register(
    registry: &mut ProcedureRegistry,
    services: &Arc<AppServices>,
    session_cookie: &str,
) -> Result<(), RegistryError> {
    ProcedureBuilder::<NoInput, Option<User>>::query("auth.me")
        .summary("The calling user, or null when not signed in")
        .public()
        .handler(bind(services, me))
        .register(registry)?;

    let cookie: Arc<str> = Arc::from(session_cookie);
    ProcedureBuilder::<NoInput, Success>::mutation("auth.logout")
        .summary("Clear the session cookie")
        .public()
        .handler(move |ctx: CallContext, _: NoInput| {
            let cookie = Arc::clone(&cookie);
            async move {
                if let Some(caller) = ctx.caller() {
                    info!(user_id = %caller.id(), "Signing out");
                }
                ctx.response().clear_cookie(&cookie);
                Ok::<_, RpcError>(Success::OK)
            }
        })
        .register(registry)
}

async fn me(svc: Arc<AppServices>, ctx: CallContext, _: NoInput) -> Result<Option<User>, RpcError> {
    match ctx.caller() {
        Some(caller) => Ok(svc.users.me(caller).await?),
        None => Ok(None),
    }
}

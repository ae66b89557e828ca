use std::sync::Arc;

use ifrof_rpc::{
    CallContext, NoInput, ProcedureBuilder, ProcedureRegistry, RegistryError, RpcError, Success,
};
use marketplace_sdk::Notification;

use super::bind;
use super::dto::{CreateNotificationInput, ListNotificationsInput, NotificationIdInput};
use crate::domain::service::AppServices;

pub(super) fn register(
    registry: &mut ProcedureRegistry,
    services: &Arc<AppServices>,
) -> Result<(), RegistryError> {
    ProcedureBuilder::<CreateNotificationInput, Success>::mutation("notifications.create")
        .summary("System hook for posting a notification to any user")
        .public()
        .handler(bind(services, create))
        .register(registry)?;

    ProcedureBuilder::<ListNotificationsInput, Vec<Notification>>::query("notifications.list")
        .authenticated()
        .handler(bind(services, list))
        .register(registry)?;

    ProcedureBuilder::<NoInput, u64>::query("notifications.getUnreadCount")
        .authenticated()
        .handler(bind(services, unread_count))
        .register(registry)?;

    ProcedureBuilder::<NotificationIdInput, Success>::mutation("notifications.markAsRead")
        .authenticated()
        .handler(bind(services, mark_as_read))
        .register(registry)?;

    ProcedureBuilder::<NoInput, Success>::mutation("notifications.markAllAsRead")
        .authenticated()
        .handler(bind(services, mark_all_as_read))
        .register(registry)
}

async fn create(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: CreateNotificationInput,
) -> Result<Success, RpcError> {
    svc.notifications.create(input.into()).await?;
    Ok(Success::OK)
}

async fn list(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: ListNotificationsInput,
) -> Result<Vec<Notification>, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc.notifications.list(caller, input.unread_only).await?)
}

async fn unread_count(
    svc: Arc<AppServices>,
    ctx: CallContext,
    _: NoInput,
) -> Result<u64, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc.notifications.unread_count(caller).await?)
}

async fn mark_as_read(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: NotificationIdInput,
) -> Result<Success, RpcError> {
    let caller = ctx.require_caller()?;
    svc.notifications
        .mark_as_read(caller, input.notification_id)
        .await?;
    Ok(Success::OK)
}

async fn mark_all_as_read(
    svc: Arc<AppServices>,
    ctx: CallContext,
    _: NoInput,
) -> Result<Success, RpcError> {
    let caller = ctx.require_caller()?;
    svc.notifications.mark_all_as_read(caller).await?;
    Ok(Success::OK)
}

use std::sync::Arc;

use ifrof_rpc::{CallContext, ProcedureBuilder, ProcedureRegistry, RegistryError, RpcError};
use ifrof_security::{Predicate, Role};
use marketplace_sdk::User;

use super::bind;
use super::dto::UpdateRoleInput;
use crate::domain::service::AppServices;

pub(super) fn register(
    registry: &mut ProcedureRegistry,
    services: &Arc<AppServices>,
) -> Result<(), RegistryError> {
    ProcedureBuilder::<UpdateRoleInput, User>::mutation("users.updateRole")
        .summary("Change a user's role and factory membership")
        .require(vec![Predicate::HasRole(Role::Admin)])
        .handler(bind(services, update_role))
        .register(registry)
}

async fn update_role(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: UpdateRoleInput,
) -> Result<User, RpcError> {
    Ok(svc
        .users
        .update_role(input.user_id, input.role, input.factory_id)
        .await?)
}

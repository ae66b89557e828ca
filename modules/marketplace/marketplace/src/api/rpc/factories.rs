use std::sync::Arc;

use ifrof_rpc::{CallContext, NoInput, ProcedureBuilder, ProcedureRegistry, RegistryError, RpcError};
use ifrof_security::{Predicate, Role};
use marketplace_sdk::Factory;

use super::bind;
use super::dto::{CreateFactoryInput, IdInput, SearchInput, UpdateFactoryInput};
use crate::domain::service::AppServices;

pub(super) fn register(
    registry: &mut ProcedureRegistry,
    services: &Arc<AppServices>,
) -> Result<(), RegistryError> {
    ProcedureBuilder::<NoInput, Vec<Factory>>::query("factories.list")
        .summary("All factories, newest first")
        .public()
        .handler(bind(services, list))
        .register(registry)?;

    ProcedureBuilder::<IdInput, Option<Factory>>::query("factories.getById")
        .public()
        .handler(bind(services, get_by_id))
        .register(registry)?;

    ProcedureBuilder::<SearchInput, Vec<Factory>>::query("factories.search")
        .summary("Case-insensitive match on name, description and location")
        .public()
        .handler(bind(services, search))
        .register(registry)?;

    ProcedureBuilder::<CreateFactoryInput, Factory>::mutation("factories.create")
        .require(vec![Predicate::HasRole(Role::Admin)])
        .handler(bind(services, create))
        .register(registry)?;

    ProcedureBuilder::<UpdateFactoryInput, Option<Factory>>::mutation("factories.update")
        .summary("Partial update; null when the factory does not exist")
        .require(vec![Predicate::HasRole(Role::Admin)])
        .handler(bind(services, update))
        .register(registry)
}

async fn list(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    _: NoInput,
) -> Result<Vec<Factory>, RpcError> {
    Ok(svc.factories.list().await?)
}

async fn get_by_id(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: IdInput,
) -> Result<Option<Factory>, RpcError> {
    Ok(svc.factories.get_by_id(input.id).await?)
}

async fn search(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: SearchInput,
) -> Result<Vec<Factory>, RpcError> {
    Ok(svc.factories.search(&input.query).await?)
}

async fn create(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: CreateFactoryInput,
) -> Result<Factory, RpcError> {
    Ok(svc.factories.create(input.into()).await?)
}

async fn update(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: UpdateFactoryInput,
) -> Result<Option<Factory>, RpcError> {
    let (id, patch) = input.into_patch();
    Ok(svc.factories.update(id, patch).await?)
}

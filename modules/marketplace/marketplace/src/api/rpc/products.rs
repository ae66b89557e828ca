use std::sync::Arc;

use ifrof_rpc::{CallContext, ProcedureBuilder, ProcedureRegistry, RegistryError, RpcError};
use ifrof_security::{Predicate, Role};
use marketplace_sdk::Product;

use super::bind;
use super::dto::{CreateProductInput, IdInput, ListProductsInput, SearchInput, UpdateProductInput};
use crate::domain::service::AppServices;

pub(super) fn register(
    registry: &mut ProcedureRegistry,
    services: &Arc<AppServices>,
) -> Result<(), RegistryError> {
    ProcedureBuilder::<ListProductsInput, Vec<Product>>::query("products.list")
        .summary("Products, optionally filtered by factory and category")
        .public()
        .handler(bind(services, list))
        .register(registry)?;

    ProcedureBuilder::<IdInput, Option<Product>>::query("products.getById")
        .public()
        .handler(bind(services, get_by_id))
        .register(registry)?;

    ProcedureBuilder::<SearchInput, Vec<Product>>::query("products.search")
        .summary("Case-insensitive match on name, description and category")
        .public()
        .handler(bind(services, search))
        .register(registry)?;

    ProcedureBuilder::<CreateProductInput, Product>::mutation("products.create")
        .require(vec![Predicate::HasRole(Role::Admin)])
        .handler(bind(services, create))
        .register(registry)?;

    ProcedureBuilder::<UpdateProductInput, Option<Product>>::mutation("products.update")
        .summary("Partial update; null when the product does not exist")
        .require(vec![Predicate::HasRole(Role::Admin)])
        .handler(bind(services, update))
        .register(registry)
}

async fn list(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: ListProductsInput,
) -> Result<Vec<Product>, RpcError> {
    Ok(svc.products.list(input.into()).await?)
}

async fn get_by_id(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: IdInput,
) -> Result<Option<Product>, RpcError> {
    Ok(svc.products.get_by_id(input.id).await?)
}

async fn search(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: SearchInput,
) -> Result<Vec<Product>, RpcError> {
    Ok(svc.products.search(&input.query).await?)
}

async fn create(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: CreateProductInput,
) -> Result<Product, RpcError> {
    Ok(svc.products.create(input.into()).await?)
}

async fn update(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: UpdateProductInput,
) -> Result<Option<Product>, RpcError> {
    let (id, patch) = input.into_patch();
    Ok(svc.products.update(id, patch).await?)
}

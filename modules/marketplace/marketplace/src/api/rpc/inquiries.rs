use std::sync::Arc;

use ifrof_rpc::{CallContext, ProcedureBuilder, ProcedureRegistry, RegistryError, RpcError};
use ifrof_security::{Predicate, Role};
use marketplace_sdk::Inquiry;

use super::bind;
use super::dto::{BuyerIdInput, CreateInquiryInput, FactoryIdInput, UpdateInquiryStatusInput};
use crate::domain::service::AppServices;

pub(super) fn register(
    registry: &mut ProcedureRegistry,
    services: &Arc<AppServices>,
) -> Result<(), RegistryError> {
    // Administrators moderate; they do not source.
    ProcedureBuilder::<CreateInquiryInput, Inquiry>::mutation("inquiries.create")
        .summary("Open an inquiry to a factory as the calling buyer")
        .require(vec![Predicate::Authenticated, Predicate::NotRole(Role::Admin)])
        .handler(bind(services, create))
        .register(registry)?;

    ProcedureBuilder::<BuyerIdInput, Vec<Inquiry>>::query("inquiries.getByBuyer")
        .require(vec![Predicate::owns(|i: &BuyerIdInput| i.buyer_id)])
        .handler(bind(services, get_by_buyer))
        .register(registry)?;

    ProcedureBuilder::<FactoryIdInput, Vec<Inquiry>>::query("inquiries.getByFactory")
        .summary("Inquiries addressed to a factory; admins and that factory's users only")
        .authenticated()
        .handler(bind(services, get_by_factory))
        .register(registry)?;

    ProcedureBuilder::<UpdateInquiryStatusInput, Inquiry>::mutation("inquiries.updateStatus")
        .authenticated()
        .handler(bind(services, update_status))
        .register(registry)
}

async fn create(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: CreateInquiryInput,
) -> Result<Inquiry, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc
        .inquiries
        .create(
            caller,
            input.factory_id,
            input.subject.trim().to_owned(),
            input.description.trim().to_owned(),
        )
        .await?)
}

async fn get_by_buyer(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: BuyerIdInput,
) -> Result<Vec<Inquiry>, RpcError> {
    Ok(svc.inquiries.get_by_buyer(input.buyer_id).await?)
}

async fn get_by_factory(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: FactoryIdInput,
) -> Result<Vec<Inquiry>, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc.inquiries.get_by_factory(caller, input.factory_id).await?)
}

async fn update_status(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: UpdateInquiryStatusInput,
) -> Result<Inquiry, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc
        .inquiries
        .update_status(caller, input.id, input.status)
        .await?)
}

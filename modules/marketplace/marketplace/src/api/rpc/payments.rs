use std::sync::Arc;

use ifrof_rpc::{CallContext, NoInput, ProcedureBuilder, ProcedureRegistry, RegistryError, RpcError};
use ifrof_security::{Predicate, Role};
use marketplace_sdk::{CheckoutSession, Order};

use super::bind;
use super::dto::{CreateCheckoutInput, FactoryOrdersInput, OrderIdInput, UpdateOrderStatusInput};
use crate::domain::service::AppServices;

pub(super) fn register(
    registry: &mut ProcedureRegistry,
    services: &Arc<AppServices>,
) -> Result<(), RegistryError> {
    ProcedureBuilder::<CreateCheckoutInput, CheckoutSession>::mutation("payments.createCheckout")
        .summary("Open a hosted checkout and record a pending order")
        .require(vec![Predicate::HasRole(Role::Buyer)])
        .handler(bind(services, create_checkout))
        .register(registry)?;

    ProcedureBuilder::<OrderIdInput, Option<Order>>::query("payments.getOrder")
        .summary("Null when absent; forbidden for orders of other buyers")
        .authenticated()
        .handler(bind(services, get_order))
        .register(registry)?;

    ProcedureBuilder::<NoInput, Vec<Order>>::query("payments.getMyOrders")
        .authenticated()
        .handler(bind(services, get_my_orders))
        .register(registry)?;

    ProcedureBuilder::<FactoryOrdersInput, Vec<Order>>::query("payments.getFactoryOrders")
        .require(vec![Predicate::HasRole(Role::Factory)])
        .handler(bind(services, get_factory_orders))
        .register(registry)?;

    ProcedureBuilder::<UpdateOrderStatusInput, Order>::mutation("payments.updateOrderStatus")
        .summary("Advance an order along pending, processing, shipped, delivered or cancel it")
        .require(vec![Predicate::HasRole(Role::Admin)])
        .handler(bind(services, update_order_status))
        .register(registry)
}

async fn create_checkout(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: CreateCheckoutInput,
) -> Result<CheckoutSession, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc
        .payments
        .create_checkout(caller, input.factory_id, input.items, input.currency)
        .await?)
}

async fn get_order(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: OrderIdInput,
) -> Result<Option<Order>, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc.payments.get_order(caller, input.order_id).await?)
}

async fn get_my_orders(
    svc: Arc<AppServices>,
    ctx: CallContext,
    _: NoInput,
) -> Result<Vec<Order>, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc.payments.get_my_orders(caller).await?)
}

async fn get_factory_orders(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: FactoryOrdersInput,
) -> Result<Vec<Order>, RpcError> {
    let caller = ctx.require_caller()?;
    Ok(svc
        .payments
        .get_factory_orders(caller, input.factory_id, input.status)
        .await?)
}

async fn update_order_status(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: UpdateOrderStatusInput,
) -> Result<Order, RpcError> {
    Ok(svc
        .payments
        .update_order_status(input.order_id, input.status)
        .await?)
}

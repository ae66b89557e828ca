//! Procedure registrations, one file per router.
//!
//! Bodies are plain `async fn(Arc<AppServices>, CallContext, Input)` items;
//! [`bind`] closes over the services so they can be handed to
//! [`ifrof_rpc::ProcedureBuilder::handler`]. Access rules that need only the
//! caller or the payload are declared at registration; everything that needs
//! a lookup is enforced by the services.

use std::sync::Arc;

use ifrof_rpc::{CallContext, ProcedureRegistry, RegistryError};

use crate::domain::service::AppServices;

pub mod dto;
pub mod error;

mod auth;
mod chatbot;
mod factories;
mod forum;
mod inquiries;
mod messages;
mod notifications;
mod payments;
mod products;
mod users;

pub use error::to_rpc_error;

/// Adapts a body taking the services into a procedure handler.
pub(crate) fn bind<I, F, Fut>(
    services: &Arc<AppServices>,
    body: F,
) -> impl Fn(CallContext, I) -> Fut + Send + Sync + 'static
where
    F: Fn(Arc<AppServices>, CallContext, I) -> Fut + Send + Sync + 'static,
{
    let services = Arc::clone(services);
    move |ctx, input| body(Arc::clone(&services), ctx, input)
}

/// Registers the whole marketplace surface.
///
/// # Errors
/// Fails when a procedure name is malformed or registered twice.
pub fn register_all(
    registry: &mut ProcedureRegistry,
    services: &Arc<AppServices>,
    session_cookie: &str,
) -> Result<(), RegistryError> {
    auth::register(registry, services, session_cookie)?;
    users::register(registry, services)?;
    factories::register(registry, services)?;
    products::register(registry, services)?;
    forum::register(registry, services)?;
    inquiries::register(registry, services)?;
    payments::register(registry, services)?;
    notifications::register(registry, services)?;
    chatbot::register(registry, services)?;
    messages::register(registry, services)?;
    Ok(())
}

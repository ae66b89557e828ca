//! The single place where domain failures become procedure errors.

use ifrof_rpc::{ErrorCode, RpcError};
use marketplace_sdk::MarketplaceError;
use tracing::error;

use crate::domain::error::DomainError;

/// Public error to wire code.
#[must_use]
pub fn to_rpc_error(e: MarketplaceError) -> RpcError {
    let code = match &e {
        MarketplaceError::Unauthorized => ErrorCode::Unauthorized,
        MarketplaceError::Forbidden { .. } => ErrorCode::Forbidden,
        MarketplaceError::NotFound { .. } => ErrorCode::NotFound,
        MarketplaceError::Validation { .. } => ErrorCode::BadRequest,
        MarketplaceError::Conflict { .. } => ErrorCode::Conflict,
        MarketplaceError::RateLimited => ErrorCode::TooManyRequests,
        MarketplaceError::PaymentRequired => ErrorCode::PaymentRequired,
        MarketplaceError::Upstream { .. } => ErrorCode::BadGateway,
        MarketplaceError::Internal => ErrorCode::InternalServerError,
    };
    RpcError::new(code, e.to_string())
}

impl From<DomainError> for RpcError {
    fn from(e: DomainError) -> Self {
        if e.is_infrastructure() {
            error!(error = %e, "Procedure failed on infrastructure");
        }
        to_rpc_error(e.into())
    }
}

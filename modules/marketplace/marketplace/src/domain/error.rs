use marketplace_sdk::{MarketplaceError, OrderStatus};
use thiserror::Error;

use crate::domain::ports::{AiChatError, PaymentError};

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Illegal order status transition from '{from}' to '{to}'")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Payment gateway error: {0}")]
    Payment(#[from] PaymentError),

    #[error("AI chat error: {0}")]
    Ai(#[from] AiChatError),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Whether the error stems from infrastructure rather than the request.
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        match self {
            Self::Database { .. } => true,
            Self::Payment(e) => !matches!(e, PaymentError::Rejected { .. }),
            Self::Ai(e) => !matches!(e, AiChatError::RateLimited | AiChatError::PaymentRequired),
            _ => false,
        }
    }
}

impl From<ifrof_security::AuthError> for DomainError {
    fn from(e: ifrof_security::AuthError) -> Self {
        match e {
            ifrof_security::AuthError::Unauthenticated => {
                Self::forbidden("authentication required")
            }
            ifrof_security::AuthError::Forbidden { reason } => Self::Forbidden { reason },
        }
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for MarketplaceError {
    fn from(domain_error: DomainError) -> Self {
        match domain_error {
            DomainError::NotFound { entity, .. } => MarketplaceError::not_found(entity),
            DomainError::Forbidden { reason } => MarketplaceError::forbidden(reason),
            DomainError::Validation { field, message } => {
                MarketplaceError::validation(format!("{field}: {message}"))
            }
            e @ DomainError::InvalidTransition { .. } => {
                MarketplaceError::validation(e.to_string())
            }
            DomainError::Database { .. } => MarketplaceError::internal(),
            DomainError::Payment(e) => match e {
                PaymentError::Misconfigured(_) => MarketplaceError::internal(),
                PaymentError::Rejected { message, .. } => MarketplaceError::upstream(message),
                PaymentError::Transport(_) | PaymentError::InvalidResponse(_) => {
                    MarketplaceError::upstream("payment gateway unavailable")
                }
            },
            DomainError::Ai(e) => match e {
                AiChatError::RateLimited => MarketplaceError::RateLimited,
                AiChatError::PaymentRequired => MarketplaceError::PaymentRequired,
                AiChatError::Misconfigured(_)
                | AiChatError::Upstream { .. }
                | AiChatError::Transport(_)
                | AiChatError::InvalidResponse(_) => MarketplaceError::internal(),
            },
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn database_details_do_not_leak() {
        let e: MarketplaceError =
            DomainError::database("relation \"orders\" does not exist").into();
        assert_eq!(e, MarketplaceError::Internal);
    }

    #[test]
    fn ai_quota_errors_stay_distinguishable() {
        let e: MarketplaceError = DomainError::from(AiChatError::RateLimited).into();
        assert_eq!(e, MarketplaceError::RateLimited);
        let e: MarketplaceError = DomainError::from(AiChatError::PaymentRequired).into();
        assert_eq!(e, MarketplaceError::PaymentRequired);
    }

    #[test]
    fn gateway_failures_are_upstream() {
        let e: MarketplaceError =
            DomainError::from(PaymentError::Transport("connection refused".to_owned())).into();
        assert!(matches!(e, MarketplaceError::Upstream { .. }));
        assert!(DomainError::from(PaymentError::Transport(String::new())).is_infrastructure());
    }
}

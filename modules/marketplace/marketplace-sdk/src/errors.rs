//! Public error types for the `marketplace` module.
//!
//! These errors are safe to expose to other modules and consumers; storage
//! and adapter details never leak through them.

use thiserror::Error;

/// Errors that can be returned by marketplace operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketplaceError {
    /// The caller carries no identity.
    #[error("Authentication required")]
    Unauthorized,

    /// The caller is identified but not allowed to act on the resource.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// A targeted resource does not exist (or is not visible to the caller).
    #[error("{entity} not found")]
    NotFound { entity: String },

    /// The request is well-formed but violates a business rule.
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// An upstream service rejected the call because of rate limiting.
    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    /// An upstream service requires payment or credits.
    #[error("Payment required, please add credits")]
    PaymentRequired,

    /// An upstream service failed or could not be reached.
    #[error("Upstream service failed: {message}")]
    Upstream { message: String },

    /// An internal error occurred.
    #[error("Internal error")]
    Internal,
}

impl MarketplaceError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::Internal
    }
}

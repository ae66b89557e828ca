use std::fmt;

use http::StatusCode;
use ifrof_security::AuthError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::problem::{Problem, ValidationViolation};

/// Machine-readable error codes of the procedure surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    PaymentRequired,
    Forbidden,
    NotFound,
    MethodNotSupported,
    Conflict,
    TooManyRequests,
    InternalServerError,
    BadGateway,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::PaymentRequired => "PAYMENT_REQUIRED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::TooManyRequests => "TOO_MANY_REQUESTS",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorCode::BadGateway => "BAD_GATEWAY",
        }
    }

    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::MethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::BadGateway => StatusCode::BAD_GATEWAY,
        }
    }

    fn title(self) -> &'static str {
        self.status().canonical_reason().unwrap_or("Error")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error returned by a procedure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct RpcError {
    pub code: ErrorCode,
    pub message: String,
    pub violations: Vec<ValidationViolation>,
}

impl RpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            violations: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    #[must_use]
    pub fn invalid_input(violations: Vec<ValidationViolation>) -> Self {
        Self {
            code: ErrorCode::BadRequest,
            message: "Input validation failed".to_owned(),
            violations,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalServerError, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadGateway, message)
    }

    /// Convert into a problem response body for `instance`.
    pub fn to_problem(&self, instance: &str) -> Problem {
        let trace_id = tracing::Span::current()
            .id()
            .map(|id| id.into_u64().to_string());

        let mut problem = Problem::new(self.code.status(), self.code.title(), &self.message)
            .with_code(self.code.as_str())
            .with_instance(instance);
        if let Some(trace_id) = trace_id {
            problem = problem.with_trace_id(trace_id);
        }
        if !self.violations.is_empty() {
            problem = problem.with_errors(self.violations.clone());
        }
        problem
    }
}

impl From<AuthError> for RpcError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthenticated => RpcError::unauthorized("Authentication required"),
            AuthError::Forbidden { reason } => RpcError::forbidden(reason),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_distinct_codes() {
        assert_eq!(
            RpcError::from(AuthError::Unauthenticated).code,
            ErrorCode::Unauthorized
        );
        assert_eq!(
            RpcError::from(AuthError::forbidden("x")).code,
            ErrorCode::Forbidden
        );
    }

    #[test]
    fn problem_carries_code_and_violations() {
        let err = RpcError::invalid_input(vec![ValidationViolation::new("name", "required")]);
        let p = err.to_problem("factories.create");
        assert_eq!(p.status, StatusCode::BAD_REQUEST);
        assert_eq!(p.code, "BAD_REQUEST");
        assert_eq!(p.instance, "factories.create");
        assert_eq!(p.errors.map(|e| e.len()), Some(1));
    }

    #[test]
    fn codes_serialize_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::InternalServerError).unwrap();
        assert_eq!(json, "\"INTERNAL_SERVER_ERROR\"");
        assert_eq!(ErrorCode::MethodNotSupported.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}

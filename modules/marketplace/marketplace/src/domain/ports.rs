//! Outbound ports: external services the domain calls into.

use async_trait::async_trait;
use marketplace_sdk::{ChatRole, Language, Message, OrderItem};
use thiserror::Error;
use uuid::Uuid;

/// Cart handed to the payment gateway.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub order_number: String,
    pub buyer_id: Uuid,
    pub buyer_email: Option<String>,
    pub factory_id: Uuid,
    pub items: Vec<OrderItem>,
    /// ISO 4217 code, lowercase.
    pub currency: String,
}

/// Session descriptor returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySession {
    pub session_id: String,
    pub checkout_url: String,
}

#[derive(Error, Debug, Clone)]
pub enum PaymentError {
    #[error("payment gateway is not configured: {0}")]
    Misconfigured(String),
    #[error("payment gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("payment gateway unreachable: {0}")]
    Transport(String),
    #[error("unexpected payment gateway response: {0}")]
    InvalidResponse(String),
}

/// Creates hosted checkout sessions.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<GatewaySession, PaymentError>;
}

/// One role-tagged entry of a conversation sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum AiChatError {
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("payment required")]
    PaymentRequired,
    #[error("AI service is not configured: {0}")]
    Misconfigured(String),
    #[error("AI service failed ({status}): {message}")]
    Upstream { status: u16, message: String },
    #[error("AI service unreachable: {0}")]
    Transport(String),
    #[error("unexpected AI service response: {0}")]
    InvalidResponse(String),
}

/// Generates assistant replies. Implementations prepend the system prompt
/// for `language`.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, language: Language, history: &[ChatTurn])
    -> Result<String, AiChatError>;
}

/// Push side of the realtime message feed. Topic is the conversation id.
pub trait MessagePublisher: Send + Sync {
    fn publish(&self, message: &Message);
}

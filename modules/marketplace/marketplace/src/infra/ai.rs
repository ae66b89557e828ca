//! OpenAI-compatible chat completion adapter.

use std::time::Duration;

use async_trait::async_trait;
use marketplace_sdk::{ChatRole, Language};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::AiConfig;
use crate::domain::ports::{AiChatError, ChatCompletion, ChatTurn};

const PROMPT_EN: &str = "You are the IFROF marketplace assistant. IFROF connects international \
buyers with verified Chinese factories. Help users find suppliers and products, explain how \
inquiries, orders and payments work on the platform, and give practical sourcing advice. \
Be concise and professional. Answer in English.";

const PROMPT_AR: &str = "أنت مساعد منصة IFROF. تربط IFROF المشترين الدوليين بالمصانع الصينية \
الموثقة. ساعد المستخدمين في العثور على الموردين والمنتجات، واشرح كيفية عمل الاستفسارات والطلبات \
والمدفوعات على المنصة، وقدم نصائح عملية في التوريد. كن موجزًا ومهنيًا. أجب باللغة العربية.";

const PROMPT_ZH: &str = "你是 IFROF 平台的智能助手。IFROF 连接国际买家与经过认证的中国工厂。\
帮助用户寻找供应商和产品，解释平台上的询价、订单和付款流程，并提供实用的采购建议。\
请简洁、专业地回答。请使用中文回答。";

/// System prompt prepended to every completion request.
#[must_use]
pub fn system_prompt(language: Language) -> &'static str {
    match language {
        Language::Ar => PROMPT_AR,
        Language::En => PROMPT_EN,
        Language::Zh => PROMPT_ZH,
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiChatClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
}

impl OpenAiChatClient {
    /// # Errors
    /// Returns [`AiChatError::Misconfigured`] when the HTTP client cannot be built.
    pub fn new(cfg: &AiConfig) -> Result<Self, AiChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| AiChatError::Misconfigured(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChatClient {
    #[instrument(skip(self, history), fields(language = %language, turns = history.len()))]
    async fn complete(
        &self,
        language: Language,
        history: &[ChatTurn],
    ) -> Result<String, AiChatError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| AiChatError::Misconfigured("ai.api_key is not set".to_owned()))?;

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage {
            role: ChatRole::System.as_str(),
            content: system_prompt(language),
        });
        messages.extend(history.iter().map(|turn| WireMessage {
            role: turn.role.as_str(),
            content: &turn.content,
        }));

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await
            .map_err(|e| AiChatError::Transport(e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            429 => {
                warn!("AI service rate limited the request");
                return Err(AiChatError::RateLimited);
            }
            402 => {
                warn!("AI service requires payment");
                return Err(AiChatError::PaymentRequired);
            }
            _ if !status.is_success() => {
                let message = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), "AI service failed");
                return Err(AiChatError::Upstream {
                    status: status.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AiChatError::InvalidResponse(e.to_string()))?;
        let reply = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiChatError::InvalidResponse("no completion choices".to_owned()))?;
        debug!(chars = reply.len(), "Completion received");
        Ok(reply)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_a_prompt() {
        assert!(system_prompt(Language::En).contains("English"));
        assert!(system_prompt(Language::Ar).contains("العربية"));
        assert!(system_prompt(Language::Zh).contains("中文"));
    }

    #[tokio::test]
    async fn missing_key_is_reported_before_any_request() {
        let client = OpenAiChatClient::new(&AiConfig::default()).unwrap();
        let err = client
            .complete(Language::En, &[ChatTurn::new(ChatRole::User, "hello")])
            .await
            .unwrap_err();
        assert!(matches!(err, AiChatError::Misconfigured(_)));
    }
}

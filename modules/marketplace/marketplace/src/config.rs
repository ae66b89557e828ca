//! Configuration for the marketplace module.
//!
//! Secrets are held as [`SecretString`] and serialize as `"***"` so the
//! effective configuration can be printed safely.

use secrecy::SecretString;
use serde::{Deserialize, Serialize, Serializer};

/// Serialize a secret as a fixed placeholder.
#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
pub fn redact<S: Serializer>(_secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("***")
}

/// Serialize an optional secret as a placeholder, or `null` when unset.
#[allow(clippy::ref_option)] // serde requires &T signature
pub fn redact_opt<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(_) => serializer.serialize_str("***"),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    pub auth: AuthConfig,
    pub payments: PaymentsConfig,
    pub ai: AiConfig,
    pub realtime: RealtimeConfig,
}

/// Session token settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens.
    #[serde(serialize_with = "redact")]
    pub session_secret: SecretString,
    pub cookie_name: String,
    pub token_ttl_secs: u64,
}

impl AuthConfig {
    pub const DEV_SECRET: &'static str = "ifrof-dev-session-secret-change-me";
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: SecretString::from(Self::DEV_SECRET),
            cookie_name: "ifrof_session".to_owned(),
            token_ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    #[default]
    Sandbox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct PaymentsConfig {
    pub provider: PaymentProvider,
    pub stripe_base_url: String,
    #[serde(serialize_with = "redact_opt")]
    pub stripe_secret_key: Option<SecretString>,
    /// Where the gateway sends the buyer after paying. The checkout session
    /// id is appended as `session_id`.
    pub success_url: String,
    pub cancel_url: String,
    pub default_currency: String,
    pub timeout_secs: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            provider: PaymentProvider::Sandbox,
            stripe_base_url: "https://api.stripe.com".to_owned(),
            stripe_secret_key: None,
            success_url: "http://localhost:3000/payment/success".to_owned(),
            cancel_url: "http://localhost:3000/payment/cancel".to_owned(),
            default_currency: "usd".to_owned(),
            timeout_secs: 15,
        }
    }
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    #[serde(serialize_with = "redact_opt")]
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_owned(),
            model: "gpt-4o-mini".to_owned(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct RealtimeConfig {
    /// Per-conversation broadcast capacity; slow subscribers lose the oldest events.
    pub channel_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = MarketplaceConfig::default();
        assert_eq!(cfg.auth.cookie_name, "ifrof_session");
        assert_eq!(cfg.payments.provider, PaymentProvider::Sandbox);
        assert_eq!(cfg.payments.default_currency, "usd");
        assert_eq!(cfg.realtime.channel_capacity, 256);
    }

    #[test]
    fn test_secrets_are_redacted() {
        let mut cfg = MarketplaceConfig::default();
        cfg.ai.api_key = Some(SecretString::from("sk-live-123"));
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("sk-live-123"));
        assert!(!json.contains(AuthConfig::DEV_SECRET));
        assert!(json.contains("\"api_key\":\"***\""));
        assert!(json.contains("\"stripe_secret_key\":null"));
    }

    #[test]
    fn test_partial_override() {
        let cfg: MarketplaceConfig = serde_json::from_str(
            r#"{"payments":{"provider":"stripe"},"realtime":{"channel_capacity":8}}"#,
        )
        .unwrap();
        assert_eq!(cfg.payments.provider, PaymentProvider::Stripe);
        assert_eq!(cfg.payments.stripe_base_url, "https://api.stripe.com");
        assert_eq!(cfg.realtime.channel_capacity, 8);
    }
}

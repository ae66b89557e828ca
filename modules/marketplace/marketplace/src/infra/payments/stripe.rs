use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::with_session_placeholder;
use crate::config::PaymentsConfig;
use crate::domain::money::to_minor_units;
use crate::domain::ports::{CheckoutRequest, GatewaySession, PaymentError, PaymentGateway};

/// Stripe Checkout adapter: `POST /v1/checkout/sessions`, form encoded.
pub struct StripeGateway {
    client: reqwest::Client,
    endpoint: String,
    secret_key: SecretString,
    success_url: String,
    cancel_url: String,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeGateway {
    /// # Errors
    /// Returns [`PaymentError::Misconfigured`] without a secret key or when
    /// the HTTP client cannot be built.
    pub fn new(cfg: &PaymentsConfig) -> Result<Self, PaymentError> {
        let secret_key = cfg
            .stripe_secret_key
            .clone()
            .ok_or_else(|| PaymentError::Misconfigured("stripe_secret_key is not set".to_owned()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| PaymentError::Misconfigured(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1/checkout/sessions",
                cfg.stripe_base_url.trim_end_matches('/')
            ),
            secret_key,
            success_url: with_session_placeholder(&cfg.success_url),
            cancel_url: cfg.cancel_url.clone(),
        })
    }

    fn form(&self, request: &CheckoutRequest) -> Result<Vec<(String, String)>, PaymentError> {
        let mut form = vec![
            ("mode".to_owned(), "payment".to_owned()),
            ("success_url".to_owned(), self.success_url.clone()),
            ("cancel_url".to_owned(), self.cancel_url.clone()),
            ("client_reference_id".to_owned(), request.order_number.clone()),
            ("metadata[order_number]".to_owned(), request.order_number.clone()),
            ("metadata[buyer_id]".to_owned(), request.buyer_id.to_string()),
            ("metadata[factory_id]".to_owned(), request.factory_id.to_string()),
        ];
        if let Some(email) = &request.buyer_email {
            form.push(("customer_email".to_owned(), email.clone()));
        }
        for (i, item) in request.items.iter().enumerate() {
            let unit_amount = to_minor_units(item.price).ok_or_else(|| {
                PaymentError::Misconfigured(format!("line item {i}: amount out of range"))
            })?;
            let prefix = format!("line_items[{i}]");
            form.push((format!("{prefix}[price_data][currency]"), request.currency.clone()));
            form.push((format!("{prefix}[price_data][unit_amount]"), unit_amount.to_string()));
            form.push((
                format!("{prefix}[price_data][product_data][name]"),
                format!("Product {}", item.product_id),
            ));
            form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }
        Ok(form)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, request), fields(order_number = %request.order_number))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<GatewaySession, PaymentError> {
        let body = serde_urlencoded::to_string(self.form(request)?)
            .map_err(|e| PaymentError::Misconfigured(format!("form encoding: {e}")))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.secret_key.expose_secret())
            .header(
                http::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| status.to_string());
            warn!(status = status.as_u16(), %message, "Stripe rejected checkout session");
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;
        let checkout_url = session
            .url
            .ok_or_else(|| PaymentError::InvalidResponse("session has no url".to_owned()))?;
        debug!(session_id = %session.id, "Stripe checkout session created");

        Ok(GatewaySession {
            session_id: session.id,
            checkout_url,
        })
    }
}

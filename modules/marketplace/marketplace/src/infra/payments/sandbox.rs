use async_trait::async_trait;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::domain::ports::{CheckoutRequest, GatewaySession, PaymentError, PaymentGateway};

/// Fabricates checkout sessions without contacting any provider.
///
/// Session ids look like `cs_sandbox_<uuid>` and the checkout URL points at
/// `/checkout/<id>` on the origin of the configured success URL.
pub struct SandboxGateway {
    origin: String,
}

impl SandboxGateway {
    /// # Errors
    /// Returns [`PaymentError::Misconfigured`] when `success_url` is not an absolute URL.
    pub fn new(success_url: &str) -> Result<Self, PaymentError> {
        let url = Url::parse(success_url)
            .map_err(|e| PaymentError::Misconfigured(format!("success_url: {e}")))?;
        Ok(Self {
            origin: url.origin().ascii_serialization(),
        })
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<GatewaySession, PaymentError> {
        let session_id = format!("cs_sandbox_{}", Uuid::new_v4().simple());
        debug!(order_number = %request.order_number, %session_id, "Sandbox checkout session");
        Ok(GatewaySession {
            checkout_url: format!("{}/checkout/{session_id}", self.origin),
            session_id,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_point_at_local_checkout() {
        let gateway = SandboxGateway::new("http://localhost:3000/payment/success").unwrap();
        let request = CheckoutRequest {
            order_number: "ORD-TEST".to_owned(),
            buyer_id: Uuid::new_v4(),
            buyer_email: None,
            factory_id: Uuid::new_v4(),
            items: Vec::new(),
            currency: "usd".to_owned(),
        };
        let session = gateway.create_checkout_session(&request).await.unwrap();
        assert!(session.session_id.starts_with("cs_sandbox_"));
        assert_eq!(
            session.checkout_url,
            format!("http://localhost:3000/checkout/{}", session.session_id)
        );
    }

    #[test]
    fn relative_success_url_is_rejected() {
        assert!(SandboxGateway::new("/payment/success").is_err());
    }
}

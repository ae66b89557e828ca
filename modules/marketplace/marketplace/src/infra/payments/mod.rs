//! Payment gateway adapters.
//!
//! - [`StripeGateway`]: hosted checkout sessions via the Stripe REST API
//! - [`SandboxGateway`]: local stand-in that fabricates sessions

use std::sync::Arc;

use tracing::info;

use crate::config::{PaymentProvider, PaymentsConfig};
use crate::domain::ports::{PaymentError, PaymentGateway};

mod sandbox;
mod stripe;

pub use sandbox::SandboxGateway;
pub use stripe::StripeGateway;

/// Builds the gateway selected by `payments.provider`.
///
/// # Errors
/// Returns [`PaymentError::Misconfigured`] when the selected provider lacks
/// required settings.
pub fn gateway_from_config(cfg: &PaymentsConfig) -> Result<Arc<dyn PaymentGateway>, PaymentError> {
    info!(provider = ?cfg.provider, "Configuring payment gateway");
    let gateway: Arc<dyn PaymentGateway> = match cfg.provider {
        PaymentProvider::Stripe => Arc::new(StripeGateway::new(cfg)?),
        PaymentProvider::Sandbox => Arc::new(SandboxGateway::new(&cfg.success_url)?),
    };
    Ok(gateway)
}

/// Appends the gateway's session id placeholder to a redirect URL.
fn with_session_placeholder(url: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}session_id={{CHECKOUT_SESSION_ID}}")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn placeholder_respects_existing_query() {
        assert_eq!(
            with_session_placeholder("https://shop.test/ok"),
            "https://shop.test/ok?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(
            with_session_placeholder("https://shop.test/ok?lang=en"),
            "https://shop.test/ok?lang=en&session_id={CHECKOUT_SESSION_ID}"
        );
    }

    #[test]
    fn stripe_without_key_is_misconfigured() {
        let cfg = PaymentsConfig {
            provider: PaymentProvider::Stripe,
            ..PaymentsConfig::default()
        };
        assert!(matches!(
            gateway_from_config(&cfg),
            Err(PaymentError::Misconfigured(_))
        ));
    }
}

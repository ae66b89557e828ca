#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Stripe and OpenAI-compatible adapters against a mock HTTP server.

use httpmock::prelude::*;
use marketplace::config::{AiConfig, PaymentProvider, PaymentsConfig};
use marketplace::domain::ports::{
    AiChatError, ChatCompletion, ChatTurn, CheckoutRequest, PaymentError, PaymentGateway,
};
use marketplace::infra::ai::OpenAiChatClient;
use marketplace::infra::payments::StripeGateway;
use marketplace_sdk::{ChatRole, Language, OrderItem};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;

fn stripe(server: &MockServer) -> StripeGateway {
    StripeGateway::new(&PaymentsConfig {
        provider: PaymentProvider::Stripe,
        stripe_base_url: server.base_url(),
        stripe_secret_key: Some(SecretString::from("sk_test_123")),
        success_url: "https://ifrof.test/payment/success".to_owned(),
        cancel_url: "https://ifrof.test/payment/cancel".to_owned(),
        ..PaymentsConfig::default()
    })
    .unwrap()
}

fn cart() -> CheckoutRequest {
    CheckoutRequest {
        order_number: "ORD-ABC123XYZ789".to_owned(),
        buyer_id: Uuid::new_v4(),
        buyer_email: Some("bea@ifrof.example".to_owned()),
        factory_id: Uuid::new_v4(),
        items: vec![OrderItem {
            product_id: Uuid::new_v4(),
            quantity: 3,
            price: Decimal::new(1250, 2),
        }],
        currency: "usd".to_owned(),
    }
}

#[tokio::test]
async fn stripe_session_is_created_with_form_encoded_line_items() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/checkout/sessions")
            .header("authorization", "Bearer sk_test_123")
            .header("content-type", "application/x-www-form-urlencoded")
            .body_includes("mode=payment")
            .body_includes("client_reference_id=ORD-ABC123XYZ789")
            .body_includes("unit_amount%5D=1250")
            .body_includes("quantity%5D=3");
        then.status(200).json_body(json!({
            "id": "cs_test_1",
            "url": "https://checkout.stripe.test/c/cs_test_1",
        }));
    });

    let session = stripe(&server).create_checkout_session(&cart()).await.unwrap();
    assert_eq!(session.session_id, "cs_test_1");
    assert_eq!(session.checkout_url, "https://checkout.stripe.test/c/cs_test_1");
    mock.assert_calls(1);
}

#[tokio::test]
async fn stripe_rejection_carries_the_provider_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/checkout/sessions");
        then.status(400)
            .json_body(json!({ "error": { "message": "Invalid currency: xyz" } }));
    });

    let err = stripe(&server)
        .create_checkout_session(&cart())
        .await
        .unwrap_err();
    match err {
        PaymentError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid currency: xyz");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn stripe_session_without_url_is_invalid() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/checkout/sessions");
        then.status(200).json_body(json!({ "id": "cs_test_2" }));
    });

    let err = stripe(&server)
        .create_checkout_session(&cart())
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::InvalidResponse(_)));
}

fn ai(server: &MockServer) -> OpenAiChatClient {
    OpenAiChatClient::new(&AiConfig {
        base_url: server.url("/v1"),
        model: "test-model".to_owned(),
        api_key: Some(SecretString::from("ai-key")),
        ..AiConfig::default()
    })
    .unwrap()
}

fn history() -> Vec<ChatTurn> {
    vec![ChatTurn::new(ChatRole::User, "Where can I source LED strips?")]
}

#[tokio::test]
async fn completion_prepends_the_language_prompt() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer ai-key")
            .body_includes("\"model\":\"test-model\"")
            .body_includes("\"role\":\"system\"")
            .body_includes("中文");
        then.status(200).json_body(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "深圳有很多供应商。" } },
            ],
        }));
    });

    let reply = ai(&server).complete(Language::Zh, &history()).await.unwrap();
    assert_eq!(reply, "深圳有很多供应商。");
    mock.assert_calls(1);
}

#[tokio::test]
async fn completion_maps_quota_statuses() {
    for (status, expected) in [(429, "rate"), (402, "payment"), (500, "upstream")] {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(status).body("upstream says no");
        });

        let err = ai(&server).complete(Language::En, &history()).await.unwrap_err();
        let matched = match err {
            AiChatError::RateLimited => "rate",
            AiChatError::PaymentRequired => "payment",
            AiChatError::Upstream { status: 500, .. } => "upstream",
            other => panic!("unexpected error: {other}"),
        };
        assert_eq!(matched, expected);
    }
}

#[tokio::test]
async fn completion_without_choices_is_invalid() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(json!({ "choices": [] }));
    });

    let err = ai(&server).complete(Language::Ar, &history()).await.unwrap_err();
    assert!(matches!(err, AiChatError::InvalidResponse(_)));
}

#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Checkout, order visibility, the order state machine and notifications.

mod support;

use ifrof_rpc::ErrorCode;
use marketplace::domain::ports::PaymentError;
use serde_json::{Value, json};
use support::{TestApp, app};
use uuid::Uuid;

async fn checkout(app: &TestApp) -> Value {
    app.ok(
        Some(&app.buyer),
        "payments.createCheckout",
        json!({
            "factoryId": app.factory.id,
            "items": [
                { "productId": Uuid::new_v4(), "quantity": 2, "price": "12.50" },
                { "productId": Uuid::new_v4(), "quantity": 1, "price": "0.99" },
            ],
        }),
    )
    .await
}

#[tokio::test]
async fn checkout_records_a_pending_order() {
    let app = app().await;
    let session = checkout(&app).await;

    let number = session["orderNumber"].as_str().unwrap();
    assert!(number.starts_with("ORD-"));
    assert_eq!(number.len(), 16);
    assert!(session["sessionId"].as_str().unwrap().starts_with("cs_sandbox_"));
    assert!(session["checkoutUrl"].as_str().unwrap().contains("/checkout/"));

    let order = app
        .ok(Some(&app.buyer), "payments.getOrder", json!({ "orderId": session["orderId"] }))
        .await;
    assert_eq!(order["status"], "pending");
    assert_eq!(order["totalAmount"], "25.99");
    assert_eq!(order["currency"], "usd");
    assert_eq!(order["buyerId"], json!(app.buyer.id));
    assert_eq!(order["checkoutSessionId"], session["sessionId"]);
    assert_eq!(order["items"].as_array().unwrap().len(), 2);

    let mine = app.ok(Some(&app.buyer), "payments.getMyOrders", json!(null)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let notes = app.ok(Some(&app.buyer), "notifications.list", json!({})).await;
    assert_eq!(notes[0]["type"], "order");
}

#[tokio::test]
async fn checkout_is_for_buyers_with_well_formed_carts() {
    let app = app().await;
    let err = app
        .call(
            Some(&app.factory_user),
            "payments.createCheckout",
            json!({ "factoryId": app.factory.id, "items": [] }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    let err = app
        .call(
            Some(&app.buyer),
            "payments.createCheckout",
            json!({
                "factoryId": app.factory.id,
                "items": [{ "productId": Uuid::new_v4(), "quantity": 0, "price": "-1" }],
                "currency": "dollars",
            }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);
    let fields: Vec<_> = err.violations.iter().map(|v| v.field.as_str()).collect();
    assert!(fields.contains(&"items[0].quantity"));
    assert!(fields.contains(&"items[0].price"));
    assert!(fields.contains(&"currency"));

    let mine = app.ok(Some(&app.buyer), "payments.getMyOrders", json!(null)).await;
    assert_eq!(mine, json!([]));
}

#[tokio::test]
async fn gateway_failures_surface_and_leave_no_order() {
    let app = app().await;
    let cases = [
        (
            PaymentError::Rejected {
                status: 402,
                message: "card_declined".to_owned(),
            },
            ErrorCode::BadGateway,
        ),
        (
            PaymentError::Transport("connection refused".to_owned()),
            ErrorCode::BadGateway,
        ),
        (
            PaymentError::InvalidResponse("session has no url".to_owned()),
            ErrorCode::BadGateway,
        ),
        (
            PaymentError::Misconfigured("stripe_secret_key is not set".to_owned()),
            ErrorCode::InternalServerError,
        ),
    ];
    for (failure, code) in cases {
        app.gateway.fail_with(failure);
        let err = app
            .call(
                Some(&app.buyer),
                "payments.createCheckout",
                json!({
                    "factoryId": app.factory.id,
                    "items": [{ "productId": Uuid::new_v4(), "quantity": 1, "price": "9.99" }],
                }),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, code);
        assert!(!err.message.contains("stripe_secret_key"));
    }

    let mine = app.ok(Some(&app.buyer), "payments.getMyOrders", json!(null)).await;
    assert_eq!(mine, json!([]));
    let count = app.ok(Some(&app.buyer), "notifications.getUnreadCount", json!(null)).await;
    assert_eq!(count, json!(0));
}

#[tokio::test]
async fn sub_cent_prices_never_reach_the_gateway() {
    let app = app().await;
    let err = app
        .call(
            Some(&app.buyer),
            "payments.createCheckout",
            json!({
                "factoryId": app.factory.id,
                "items": [{ "productId": Uuid::new_v4(), "quantity": 100, "price": "0.005" }],
            }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);
    assert_eq!(err.violations[0].field, "items[0].price");

    let mine = app.ok(Some(&app.buyer), "payments.getMyOrders", json!(null)).await;
    assert_eq!(mine, json!([]));
}

#[tokio::test]
async fn order_visibility() {
    let app = app().await;
    let session = checkout(&app).await;
    let input = json!({ "orderId": session["orderId"] });

    let missing = app
        .ok(Some(&app.other_buyer), "payments.getOrder", json!({ "orderId": Uuid::new_v4() }))
        .await;
    assert!(missing.is_null());

    let err = app
        .call(Some(&app.other_buyer), "payments.getOrder", input.clone())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    for who in [&app.admin, &app.factory_user] {
        let order = app.ok(Some(who), "payments.getOrder", input.clone()).await;
        assert_eq!(order["id"], session["orderId"]);
    }

    let factory_orders = app
        .ok(
            Some(&app.factory_user),
            "payments.getFactoryOrders",
            json!({ "factoryId": app.factory.id, "status": "pending" }),
        )
        .await;
    assert_eq!(factory_orders.as_array().unwrap().len(), 1);

    let shipped = app
        .ok(
            Some(&app.factory_user),
            "payments.getFactoryOrders",
            json!({ "factoryId": app.factory.id, "status": "shipped" }),
        )
        .await;
    assert_eq!(shipped, json!([]));
}

#[tokio::test]
async fn orders_follow_the_fulfilment_state_machine() {
    let app = app().await;
    let session = checkout(&app).await;
    let set = |status: &str| {
        let input = json!({ "orderId": session["orderId"], "status": status });
        app.call(Some(&app.admin), "payments.updateOrderStatus", input)
    };

    let err = set("shipped").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);

    for status in ["processing", "shipped", "delivered"] {
        let order = set(status).await.unwrap();
        assert_eq!(order["status"], status);
    }

    let err = set("cancelled").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);

    let err = app
        .call(
            Some(&app.admin),
            "payments.updateOrderStatus",
            json!({ "orderId": Uuid::new_v4(), "status": "processing" }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    // Creation plus three transitions.
    let count = app.ok(Some(&app.buyer), "notifications.getUnreadCount", json!(null)).await;
    assert_eq!(count, json!(4));
}

#[tokio::test]
async fn pending_orders_can_be_cancelled() {
    let app = app().await;
    let session = checkout(&app).await;
    let order = app
        .ok(
            Some(&app.admin),
            "payments.updateOrderStatus",
            json!({ "orderId": session["orderId"], "status": "cancelled" }),
        )
        .await;
    assert_eq!(order["status"], "cancelled");

    let err = app
        .call(
            Some(&app.buyer),
            "payments.updateOrderStatus",
            json!({ "orderId": session["orderId"], "status": "pending" }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn notifications_can_be_created_without_a_session() {
    let app = app().await;
    let ok = app
        .ok(
            None,
            "notifications.create",
            json!({
                "type": "system",
                "title": "Maintenance",
                "message": "Downtime at 02:00 UTC",
                "userId": app.other_buyer.id,
                "link": "/status",
            }),
        )
        .await;
    assert_eq!(ok, json!({ "success": true }));

    let notes = app.ok(Some(&app.other_buyer), "notifications.list", json!({})).await;
    assert_eq!(notes[0]["title"], "Maintenance");
    assert_eq!(notes[0]["isRead"], false);
    assert_eq!(notes[0]["link"], "/status");
}

#[tokio::test]
async fn mark_read_is_scoped_to_the_recipient() {
    let app = app().await;
    for title in ["One", "Two", "Three"] {
        app.ok(
            None,
            "notifications.create",
            json!({ "type": "message", "title": title, "message": "-", "userId": app.buyer.id }),
        )
        .await;
    }
    let notes = app.ok(Some(&app.buyer), "notifications.list", json!({})).await;
    let first = notes[0]["id"].clone();

    let err = app
        .call(
            Some(&app.other_buyer),
            "notifications.markAsRead",
            json!({ "notificationId": first }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    for _ in 0..2 {
        let ok = app
            .ok(Some(&app.buyer), "notifications.markAsRead", json!({ "notificationId": first }))
            .await;
        assert_eq!(ok, json!({ "success": true }));
    }

    let unread = app
        .ok(Some(&app.buyer), "notifications.list", json!({ "unreadOnly": true }))
        .await;
    assert_eq!(unread.as_array().unwrap().len(), 2);
    let count = app.ok(Some(&app.buyer), "notifications.getUnreadCount", json!(null)).await;
    assert_eq!(count, json!(2));
}

#[tokio::test]
async fn mark_all_as_read_is_idempotent() {
    let app = app().await;
    for title in ["A", "B"] {
        app.ok(
            None,
            "notifications.create",
            json!({ "type": "system", "title": title, "message": "-", "userId": app.buyer.id }),
        )
        .await;
    }

    for _ in 0..2 {
        let ok = app
            .ok(Some(&app.buyer), "notifications.markAllAsRead", json!(null))
            .await;
        assert_eq!(ok, json!({ "success": true }));
        let count = app.ok(Some(&app.buyer), "notifications.getUnreadCount", json!(null)).await;
        assert_eq!(count, json!(0));
    }

    let all = app.ok(Some(&app.buyer), "notifications.list", json!(null)).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

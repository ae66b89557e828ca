#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Factory and product catalog plus the community forum.

mod support;

use ifrof_rpc::ErrorCode;
use serde_json::json;
use support::app;
use uuid::Uuid;

#[tokio::test]
async fn created_factory_is_searchable_by_name_and_location() {
    let app = app().await;
    let created = app
        .ok(
            Some(&app.admin),
            "factories.create",
            json!({
                "name": "  Dongguan Mould Co  ",
                "location": "Dongguan",
                "contactEmail": "info@dgmould.example",
            }),
        )
        .await;
    assert_eq!(created["name"], "Dongguan Mould Co");
    assert_eq!(created["verificationStatus"], "pending");

    let by_name = app.ok(None, "factories.search", json!({ "query": "MOULD" })).await;
    assert_eq!(by_name.as_array().unwrap().len(), 1);
    assert_eq!(by_name[0]["id"], created["id"]);

    let by_location = app.ok(None, "factories.search", json!({ "query": "guan" })).await;
    let names: Vec<_> = by_location
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_owned())
        .collect();
    assert!(names.contains(&"Dongguan Mould Co".to_owned()));
    assert!(names.contains(&"Shenzhen Precision Parts".to_owned()));
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let app = app().await;
    let hits = app.ok(None, "factories.search", json!({ "query": "%" })).await;
    assert_eq!(hits, json!([]));
}

#[tokio::test]
async fn factory_contact_email_is_validated() {
    let app = app().await;
    let err = app
        .call(
            Some(&app.admin),
            "factories.create",
            json!({ "name": "Bad Mail", "contactEmail": "not-an-email" }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);
    assert_eq!(err.violations[0].field, "contactEmail");
}

#[tokio::test]
async fn updating_a_missing_record_returns_null() {
    let app = app().await;
    let factory = app
        .ok(
            Some(&app.admin),
            "factories.update",
            json!({ "id": Uuid::new_v4(), "name": "Ghost" }),
        )
        .await;
    assert!(factory.is_null());

    let product = app
        .ok(
            Some(&app.admin),
            "products.update",
            json!({ "id": Uuid::new_v4(), "price": "3.00" }),
        )
        .await;
    assert!(product.is_null());

    let missing = app
        .ok(None, "factories.getById", json!({ "id": Uuid::new_v4() }))
        .await;
    assert!(missing.is_null());
}

#[tokio::test]
async fn factory_update_only_touches_given_fields() {
    let app = app().await;
    let updated = app
        .ok(
            Some(&app.admin),
            "factories.update",
            json!({ "id": app.other_factory.id, "verificationStatus": "verified" }),
        )
        .await;
    assert_eq!(updated["verificationStatus"], "verified");
    assert_eq!(updated["name"], "Ningbo Textiles");
    assert_eq!(updated["location"], "Ningbo, Zhejiang");
}

#[tokio::test]
async fn products_round_trip_through_create_list_and_search() {
    let app = app().await;
    let created = app
        .ok(
            Some(&app.admin),
            "products.create",
            json!({
                "factoryId": app.factory.id,
                "name": "Stainless hex bolt M8",
                "category": "fasteners",
                "price": "12.5",
            }),
        )
        .await;
    assert_eq!(created["price"], "12.50");
    assert_eq!(created["minOrderQuantity"], 1);

    app.ok(
        Some(&app.admin),
        "products.create",
        json!({
            "factoryId": app.other_factory.id,
            "name": "Cotton twill",
            "category": "textiles",
            "price": 4,
            "minOrderQuantity": 500,
        }),
    )
    .await;

    let fasteners = app
        .ok(None, "products.list", json!({ "category": "fasteners" }))
        .await;
    assert_eq!(fasteners.as_array().unwrap().len(), 1);

    let by_factory = app
        .ok(None, "products.list", json!({ "factoryId": app.other_factory.id }))
        .await;
    assert_eq!(by_factory[0]["minOrderQuantity"], 500);

    let hits = app.ok(None, "products.search", json!({ "query": "hex" })).await;
    assert_eq!(hits[0]["id"], created["id"]);

    let fetched = app.ok(None, "products.getById", json!({ "id": created["id"] })).await;
    assert_eq!(fetched["category"], "fasteners");
    let missing = app.ok(None, "products.getById", json!({ "id": Uuid::new_v4() })).await;
    assert!(missing.is_null());

    let updated = app
        .ok(
            Some(&app.admin),
            "products.update",
            json!({ "id": created["id"], "price": "11.99" }),
        )
        .await;
    assert_eq!(updated["price"], "11.99");
    assert_eq!(updated["name"], "Stainless hex bolt M8");
}

#[tokio::test]
async fn negative_prices_are_rejected() {
    let app = app().await;
    let err = app
        .call(
            Some(&app.admin),
            "products.create",
            json!({ "factoryId": app.factory.id, "name": "Refund", "price": "-1" }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);
}

#[tokio::test]
async fn posts_are_filtered_by_category() {
    let app = app().await;
    let post = app
        .ok(
            Some(&app.buyer),
            "forum.createPost",
            json!({
                "title": "Incoterms for sea freight",
                "content": "FOB or CIF?",
                "category": "logistics",
                "tags": ["shipping", "incoterms"],
            }),
        )
        .await;
    assert_eq!(post["authorId"], json!(app.buyer.id));
    assert_eq!(post["tags"], json!(["shipping", "incoterms"]));

    app.ok(
        Some(&app.factory_user),
        "forum.createPost",
        json!({ "title": "QC checklists", "content": "Share yours" }),
    )
    .await;

    let all = app.ok(None, "forum.listPosts", json!(null)).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    let logistics = app
        .ok(None, "forum.listPosts", json!({ "category": "logistics" }))
        .await;
    assert_eq!(logistics.as_array().unwrap().len(), 1);

    let fetched = app.ok(None, "forum.getPost", json!({ "id": post["id"] })).await;
    assert_eq!(fetched["title"], "Incoterms for sea freight");
}

#[tokio::test]
async fn answering_a_missing_post_still_succeeds() {
    let app = app().await;
    let post_id = Uuid::new_v4();
    let answer = app
        .ok(
            Some(&app.buyer),
            "forum.createAnswer",
            json!({ "postId": post_id, "content": "Orphan" }),
        )
        .await;
    assert_eq!(answer["postId"], json!(post_id));
    assert_eq!(answer["votes"], 0);

    let answers = app.ok(None, "forum.getAnswers", json!({ "postId": post_id })).await;
    assert_eq!(answers.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn answers_notify_the_post_author() {
    let app = app().await;
    let post = app
        .ok(
            Some(&app.buyer),
            "forum.createPost",
            json!({ "title": "MOQ negotiation", "content": "Tips?" }),
        )
        .await;

    // Answering your own post is silent.
    app.ok(
        Some(&app.buyer),
        "forum.createAnswer",
        json!({ "postId": post["id"], "content": "Bump" }),
    )
    .await;
    let count = app.ok(Some(&app.buyer), "notifications.getUnreadCount", json!(null)).await;
    assert_eq!(count, json!(0));

    app.ok(
        Some(&app.factory_user),
        "forum.createAnswer",
        json!({ "postId": post["id"], "content": "Offer a longer contract" }),
    )
    .await;
    let notes = app.ok(Some(&app.buyer), "notifications.list", json!({})).await;
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(notes[0]["type"], "forum");
}

#[tokio::test]
async fn one_vote_per_user_and_answer() {
    let app = app().await;
    let answer = app
        .ok(
            Some(&app.factory_user),
            "forum.createAnswer",
            json!({ "postId": Uuid::new_v4(), "content": "Use a bonded warehouse" }),
        )
        .await;
    let vote = |who, kind: &str| {
        let input = json!({ "answerId": answer["id"], "voteType": kind });
        app.ok(Some(who), "forum.voteAnswer", input)
    };

    assert_eq!(vote(&app.buyer, "up").await, json!({ "success": true, "votes": 1 }));
    assert_eq!(vote(&app.buyer, "up").await["votes"], 1);
    assert_eq!(vote(&app.other_buyer, "up").await["votes"], 2);
    assert_eq!(vote(&app.buyer, "down").await["votes"], 0);

    let answers = app
        .ok(None, "forum.getAnswers", json!({ "postId": answer["postId"] }))
        .await;
    assert_eq!(answers[0]["votes"], 0);
}

#[tokio::test]
async fn voting_on_a_missing_answer_is_not_found() {
    let app = app().await;
    let err = app
        .call(
            Some(&app.buyer),
            "forum.voteAnswer",
            json!({ "answerId": Uuid::new_v4(), "voteType": "up" }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let err = app
        .call(
            Some(&app.buyer),
            "forum.voteAnswer",
            json!({ "answerId": Uuid::new_v4(), "voteType": "sideways" }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);
}

#[tokio::test]
async fn only_the_post_author_marks_the_best_answer() {
    let app = app().await;
    let post = app
        .ok(
            Some(&app.buyer),
            "forum.createPost",
            json!({ "title": "Payment terms", "content": "30% deposit normal?" }),
        )
        .await;
    let answer = |who, content: &str| {
        let input = json!({ "postId": post["id"], "content": content });
        app.ok(Some(who), "forum.createAnswer", input)
    };
    let first = answer(&app.factory_user, "Yes, 30/70 is standard").await;
    let second = answer(&app.other_buyer, "Try a letter of credit").await;

    let err = app
        .call(
            Some(&app.other_buyer),
            "forum.markBestAnswer",
            json!({ "answerId": first["id"] }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let ok = app
        .ok(Some(&app.buyer), "forum.markBestAnswer", json!({ "answerId": first["id"] }))
        .await;
    assert_eq!(ok, json!({ "success": true }));
    app.ok(Some(&app.buyer), "forum.markBestAnswer", json!({ "answerId": second["id"] }))
        .await;

    let answers = app.ok(None, "forum.getAnswers", json!({ "postId": post["id"] })).await;
    let best: Vec<_> = answers
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["isBest"] == json!(true))
        .collect();
    assert_eq!(best.len(), 1);
    assert_eq!(best[0]["id"], second["id"]);
    assert_eq!(answers[0]["id"], second["id"]);
}

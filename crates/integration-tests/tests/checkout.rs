//! Checkout through HTTP: an order and all of its lines, or nothing.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use akwaba_core::{OrderId, ProductId};
use akwaba_integration_tests::{TestApp, checkout_body};

#[tokio::test]
async fn order_round_trip() {
    let app = TestApp::new();
    let p1 = app.seed_product("Body coton", 10).await;
    let p2 = app.seed_product("Bavoir", 5).await;

    let response = app
        .post("/orders", &checkout_body(&[(p1, 2, 10), (p2, 1, 5)], 25), None)
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.message(), "order created");
    let order_id = response.body["order_id"].as_i64().unwrap();

    let admin = app.admin_token().await;
    let detail = app
        .get(&format!("/orders/{order_id}"), Some(&admin))
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["customer_name"], "Aya Traore");
    assert_eq!(detail.body["status"], "pending");
    assert_eq!(detail.body["total"], json!(25.0));

    let items = detail.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["product_name"], "Body coton");
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(items[1]["product_name"], "Bavoir");
    assert_eq!(items[1]["quantity"], 1);

    assert_eq!(app.store.open_transactions(), 0);
}

#[tokio::test]
async fn unknown_product_leaves_nothing_behind() {
    let app = TestApp::new();
    let p1 = app.seed_product("Body coton", 10).await;

    let response = app
        .post(
            "/orders",
            &checkout_body(&[(p1, 1, 10), (ProductId::new(9_999), 1, 5)], 15),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.message(), "Failed to create order");
    assert!(response.body.get("order_id").is_none());

    // The header id that was allocated inside the transaction was never persisted
    assert_eq!(app.store.order_count().await, 0);
    assert_eq!(app.store.order_item_count().await, 0);
    assert_eq!(app.store.items_for_order(OrderId::new(1)).await, 0);
    assert_eq!(app.store.open_transactions(), 0);
}

#[tokio::test]
async fn failure_at_any_line_rolls_back_the_whole_order() {
    let app = TestApp::new();
    let mut lines = Vec::new();
    for n in 1..=4 {
        let id = app.seed_product(&format!("Article {n}"), 100).await;
        lines.push((id, 1, 100));
    }
    let body = checkout_body(&lines, 400);

    for k in 1..=4 {
        app.store.inject_item_failure(k).await;

        let response = app.post("/orders", &body, None).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "line {k}");
        assert_eq!(response.message(), "Failed to create order");
        assert_eq!(app.store.order_count().await, 0, "line {k}");
        assert_eq!(app.store.order_item_count().await, 0, "line {k}");
        assert_eq!(app.store.open_transactions(), 0, "line {k}");
    }
    assert_eq!(app.store.rollback_count(), 4);

    app.store.clear_faults().await;
    let response = app.post("/orders", &body, None).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(app.store.order_count().await, 1);
    assert_eq!(app.store.order_item_count().await, 4);
}

#[tokio::test]
async fn header_and_commit_failures_persist_nothing() {
    let app = TestApp::new();
    let p1 = app.seed_product("Body coton", 10).await;
    let body = checkout_body(&[(p1, 3, 10)], 30);

    app.store.inject_header_failure().await;
    let response = app.post("/orders", &body, None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    app.store.clear_faults().await;
    app.store.inject_commit_failure().await;
    let response = app.post("/orders", &body, None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.message(), "Failed to create order");

    assert_eq!(app.store.order_count().await, 0);
    assert_eq!(app.store.order_item_count().await, 0);
    assert_eq!(app.store.open_transactions(), 0);
}

#[tokio::test]
async fn invalid_checkout_is_rejected_before_any_write() {
    let app = TestApp::new();
    let p1 = app.seed_product("Body coton", 10).await;

    let empty = app.post("/orders", &checkout_body(&[], 0), None).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let zero_quantity = app
        .post("/orders", &checkout_body(&[(p1, 0, 10)], 0), None)
        .await;
    assert_eq!(zero_quantity.status, StatusCode::BAD_REQUEST);

    let mut bad_email = checkout_body(&[(p1, 1, 10)], 10);
    bad_email["email"] = json!("nobody");
    assert_eq!(
        app.post("/orders", &bad_email, None).await.status,
        StatusCode::BAD_REQUEST
    );

    let mut no_name = checkout_body(&[(p1, 1, 10)], 10);
    no_name["first_name"] = json!("  ");
    assert_eq!(
        app.post("/orders", &no_name, None).await.status,
        StatusCode::BAD_REQUEST
    );

    let malformed = app.post("/orders", &json!({"items": "many"}), None).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.store.order_count().await, 0);
    assert_eq!(app.store.rollback_count(), 0);
}

#[tokio::test]
async fn amounts_beyond_stored_precision_are_rejected() {
    let app = TestApp::new();
    let p1 = app.seed_product("Body coton", 10).await;

    let mut fractional_cent = checkout_body(&[(p1, 1, 10)], 10);
    fractional_cent["items"][0]["price"] = json!(10.005);
    let response = app.post("/orders", &fractional_cent, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.message().contains("price"));

    let mut oversized = checkout_body(&[(p1, 1, 10)], 10);
    oversized["total"] = json!(1e13);
    let response = app.post("/orders", &oversized, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.message().contains("total"));

    assert_eq!(app.store.order_count().await, 0);
    assert_eq!(app.store.rollback_count(), 0);
}

#[tokio::test]
async fn declared_total_is_stored_as_sent() {
    let app = TestApp::new();
    let p1 = app.seed_product("Body coton", 10).await;

    // Mismatch is logged, not rejected
    let response = app
        .post("/orders", &checkout_body(&[(p1, 2, 10)], 19), None)
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let admin = app.admin_token().await;
    let orders = app.get("/orders", Some(&admin)).await;
    assert_eq!(orders.body[0]["total"], json!(19.0));
}

#[tokio::test]
async fn customers_see_orders_placed_with_their_email() {
    let app = TestApp::new();
    let p1 = app.seed_product("Body coton", 10).await;
    let token = app.customer_token("aya@example.ci", "secret").await;
    let other = app.customer_token("other@example.ci", "secret").await;

    let response = app
        .post("/orders", &checkout_body(&[(p1, 1, 10)], 10), None)
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let mine = app.get("/my-orders", Some(&token)).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.body.as_array().unwrap().len(), 1);
    assert_eq!(mine.body[0]["id"], response.body["order_id"]);

    let theirs = app.get("/my-orders", Some(&other)).await;
    assert_eq!(theirs.body, json!([]));
}

#[tokio::test]
async fn admin_updates_order_status() {
    let app = TestApp::new();
    let p1 = app.seed_product("Body coton", 10).await;
    let admin = app.admin_token().await;

    let created = app
        .post("/orders", &checkout_body(&[(p1, 1, 10)], 10), None)
        .await;
    let order_id = created.body["order_id"].as_i64().unwrap();
    let uri = format!("/orders/{order_id}/status");

    let blank = app.put(&uri, &json!({"status": " "}), Some(&admin)).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let updated = app.put(&uri, &json!({"status": "shipped"}), Some(&admin)).await;
    assert_eq!(updated.status, StatusCode::OK);

    let detail = app.get(&format!("/orders/{order_id}"), Some(&admin)).await;
    assert_eq!(detail.body["status"], "shipped");

    let missing = app
        .put("/orders/9999/status", &json!({"status": "shipped"}), Some(&admin))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.get("/orders/9999", Some(&admin)).await.status,
        StatusCode::NOT_FOUND
    );
}

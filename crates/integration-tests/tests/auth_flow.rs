//! Signup, login, token lifetime and profile over the full router.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use akwaba_core::{AccountId, Role};
use akwaba_integration_tests::TestApp;

#[tokio::test]
async fn signup_then_login_issues_customer_token() {
    let app = TestApp::new();

    let signup = app
        .post(
            "/signup",
            &json!({
                "email": "a@x.com",
                "password": "secret",
                "full_name": "Jean Kouassi",
                "phone": "0102",
            }),
            None,
        )
        .await;
    assert_eq!(signup.status, StatusCode::CREATED);
    let id = signup.body["id"].as_i64().unwrap();
    assert!(id > 0);

    let login = app
        .post("/login", &json!({"email": "a@x.com", "password": "secret"}), None)
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["role"], "customer");
    assert_eq!(login.body["display_name"], "Jean Kouassi");

    let claims = app
        .state
        .tokens()
        .verify(login.body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.role, Role::Customer);
    assert_eq!(i64::from(claims.account_id.as_i32()), id);
}

#[tokio::test]
async fn duplicate_signup_is_conflict() {
    let app = TestApp::new();
    let body = json!({"email": "dup@x.com", "password": "secret", "full_name": "A B"});

    assert_eq!(app.post("/signup", &body, None).await.status, StatusCode::CREATED);
    let second = app.post("/signup", &body, None).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn signup_rejects_bad_input() {
    let app = TestApp::new();

    let short = app
        .post(
            "/signup",
            &json!({"email": "s@x.com", "password": "12345", "full_name": "A"}),
            None,
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let bad_email = app
        .post(
            "/signup",
            &json!({"email": "not-an-email", "password": "secret", "full_name": "A"}),
            None,
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let missing_field = app
        .post("/signup", &json!({"email": "m@x.com"}), None)
        .await;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.customer_token("known@x.com", "secret").await;

    let wrong_password = app
        .post("/login", &json!({"email": "known@x.com", "password": "nope!!"}), None)
        .await;
    let unknown_email = app
        .post("/login", &json!({"email": "ghost@x.com", "password": "secret"}), None)
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, wrong_password.status);
    assert_eq!(unknown_email.body, wrong_password.body);
    assert_eq!(wrong_password.message(), "Invalid email or password");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = TestApp::new();
    let token = app.customer_token("late@x.com", "secret").await;
    let claims = app.state.tokens().verify(&token).unwrap();

    // Issued two days ago, so its 24h lifetime is over
    let stale = app
        .state
        .tokens()
        .issue_at(
            claims.account_id,
            Role::Customer,
            unix_now() - 2 * 24 * 60 * 60,
        )
        .unwrap();

    let response = app.get("/profile", Some(&stale)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "authentication required");
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let app = TestApp::new();
    let token = app.customer_token("t@x.com", "secret").await;
    // Swap one character inside the payload segment
    let at = token.find('.').unwrap() + 4;
    let original = token.as_bytes()[at];
    let replacement = if original == b'x' { "y" } else { "x" };
    let mut tampered = token.clone();
    tampered.replace_range(at..=at, replacement);

    let response = app.get("/profile", Some(&tampered)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_reads_and_updates_own_account() {
    let app = TestApp::new();
    let token = app.customer_token("me@x.com", "secret").await;

    let profile = app.get("/profile", Some(&token)).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["email"], "me@x.com");
    assert_eq!(profile.body["first_name"], "Test");
    assert_eq!(profile.body["last_name"], "Customer");

    let update = app
        .put(
            "/profile",
            &json!({"first_name": "Awa", "last_name": "Kone", "phone": "0505"}),
            Some(&token),
        )
        .await;
    assert_eq!(update.status, StatusCode::OK);

    let profile = app.get("/profile", Some(&token)).await;
    assert_eq!(profile.body["first_name"], "Awa");
    assert_eq!(profile.body["last_name"], "Kone");
    assert_eq!(profile.body["phone"], "0505");
}

#[tokio::test]
async fn profile_of_vanished_account_is_not_found() {
    let app = TestApp::new();
    let token = app.token_for(AccountId::new(9_999), Role::Customer);

    let response = app.get("/profile", Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

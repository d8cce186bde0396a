//! Integration tests for the Akwaba storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Router-level tests over the in-memory store
//! cargo test -p akwaba-integration-tests
//!
//! # Include the PostgreSQL suite (needs DATABASE_URL)
//! cargo test -p akwaba-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Signup, login, tokens, profile
//! - `authorization` - 401 vs 403 across protected routes
//! - `checkout` - All-or-nothing order commit
//! - `catalog` - Admin CRUD and public reads
//! - `rate_limit` - Per-peer throttling of credential endpoints
//! - `postgres` - The same guarantees against a real database

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use akwaba_core::{AccountId, Email, Money, ProductId, Role};
use akwaba_storefront::db::{AccountStore, MemoryStore};
use akwaba_storefront::models::NewAccount;
use akwaba_storefront::services::auth::hash_password;
use akwaba_storefront::state::AppState;
use akwaba_storefront::config::StorefrontConfig;
use akwaba_storefront::testing::{memory_state, memory_state_with};

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, `Value::Null` when the body is empty or not JSON.
    pub body: Value,
}

impl TestResponse {
    /// The `message` field of an error or acknowledgement body.
    #[must_use]
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

/// The full router over a fresh [`MemoryStore`].
#[derive(Clone)]
pub struct TestApp {
    pub state: AppState,
    pub store: MemoryStore,
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::from_state(memory_state())
    }

    /// Same as [`new`](Self::new) with a custom configuration.
    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        Self::from_state(memory_state_with(config))
    }

    fn from_state((state, store): (AppState, MemoryStore)) -> Self {
        let router = akwaba_storefront::app(state.clone());
        Self {
            state,
            store,
            router,
        }
    }

    /// Send one request through the whole middleware stack.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        self.raw(request).await
    }

    /// Send a prebuilt request.
    ///
    /// # Panics
    ///
    /// Panics if the body cannot be read.
    pub async fn raw(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, None, token).await
    }

    pub async fn post(&self, uri: &str, body: &Value, token: Option<&str>) -> TestResponse {
        self.send(Method::POST, uri, Some(body), token).await
    }

    pub async fn put(&self, uri: &str, body: &Value, token: Option<&str>) -> TestResponse {
        self.send(Method::PUT, uri, Some(body), token).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, uri, None, token).await
    }

    /// Sign up a customer and return the login token.
    ///
    /// # Panics
    ///
    /// Panics if signup or login does not succeed.
    pub async fn customer_token(&self, email: &str, password: &str) -> String {
        let signup = self
            .post(
                "/signup",
                &json!({"email": email, "password": password, "full_name": "Test Customer"}),
                None,
            )
            .await;
        assert_eq!(signup.status, StatusCode::CREATED, "{:?}", signup.body);

        let login = self
            .post("/login", &json!({"email": email, "password": password}), None)
            .await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);
        login.body["token"]
            .as_str()
            .expect("login returns a token")
            .to_owned()
    }

    /// Create an admin account directly in storage and return its token.
    ///
    /// # Panics
    ///
    /// Panics if the account cannot be created.
    pub async fn admin_token(&self) -> String {
        let account = self
            .store
            .create_account(&NewAccount {
                email: Email::parse("admin@akwaba.ci").expect("valid email"),
                password_hash: hash_password("admin-password").expect("hash"),
                full_name: "Back Office".to_owned(),
                phone: String::new(),
                role: Role::Admin,
            })
            .await
            .expect("admin account created");
        self.token_for(account.id, Role::Admin)
    }

    /// Mint a token without touching storage.
    ///
    /// # Panics
    ///
    /// Panics if signing fails.
    #[must_use]
    pub fn token_for(&self, account_id: AccountId, role: Role) -> String {
        self.state
            .tokens()
            .issue(account_id, role)
            .expect("token signs")
    }

    pub async fn seed_product(&self, name: &str, price: i64) -> ProductId {
        self.store
            .seed_product(name, Money::new(price.into()))
            .await
    }
}

/// Checkout body for `items` as `(product, quantity, unit price)`.
#[must_use]
pub fn checkout_body(items: &[(ProductId, i32, i64)], total: i64) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(id, quantity, price)| json!({"id": id, "quantity": quantity, "price": price}))
        .collect();
    json!({
        "first_name": "Aya",
        "last_name": "Traore",
        "email": "aya@example.ci",
        "phone": "0707070707",
        "delivery_method": "delivery",
        "shipping_city": "Abidjan",
        "shipping_commune": "Cocody",
        "shipping_address": "Rue des Jardins",
        "items": items,
        "total": total,
    })
}

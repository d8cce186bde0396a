//! Builders for tests: a configuration that needs no environment and an
//! application state over [`MemoryStore`].

use std::sync::Arc;

use secrecy::SecretString;

use crate::config::{Posture, StorefrontConfig};
use crate::db::MemoryStore;
use crate::state::AppState;

/// Signing secret used by [`test_config`].
pub const TEST_JWT_SECRET: &str = "t3st-k3y-Zq9!vB7@xN2#mL5$pR8%wK4^";

/// Development configuration with rate limiting off.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/akwaba_test"),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        posture: Posture::Development,
        jwt_secret: SecretString::from(TEST_JWT_SECRET),
        cors_origins: Vec::new(),
        db_max_connections: 1,
        rate_limit: false,
        trust_proxy_headers: false,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// State over a fresh in-memory store. The store handle is returned for
/// seeding and fault injection.
#[must_use]
pub fn memory_state() -> (AppState, MemoryStore) {
    memory_state_with(test_config())
}

/// State over a fresh in-memory store with a custom configuration.
#[must_use]
pub fn memory_state_with(config: StorefrontConfig) -> (AppState, MemoryStore) {
    let store = MemoryStore::new();
    let state = AppState::new(config, Arc::new(store.clone()));
    (state, store)
}

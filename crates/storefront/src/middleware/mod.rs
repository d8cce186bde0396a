//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. Rate limiting on `/login` and `/signup` (governor)
//! 6. Admin gate on admin routes (`route_layer`)

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{Authenticated, authorize, bearer_token, require_admin};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;

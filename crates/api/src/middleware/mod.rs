//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS headers (every response, errors included)

pub mod auth;
pub mod cors;
pub mod request_id;

pub use auth::{BearerToken, require_session};
pub use cors::cors_headers_middleware;
pub use request_id::request_id_middleware;

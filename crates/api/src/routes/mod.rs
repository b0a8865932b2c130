//! Route definitions for the API.
//!
//! # Routes
//!
//! ```text
//! POST    /admin         - Action router (see `actions`)
//! OPTIONS /admin         - CORS preflight
//! GET     /catalog       - Storefront products and active drop
//! GET     /health        - Liveness
//! GET     /health/ready  - Readiness (database ping)
//! ```

pub mod actions;
pub mod catalog;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin", post(actions::dispatch).options(actions::preflight))
        .route("/catalog", get(catalog::storefront))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable. State
/// without a database has nothing to check.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };

    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

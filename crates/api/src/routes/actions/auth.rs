//! Login, logout and password rotation.

use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::{Action, ActionResult};
use crate::middleware::BearerToken;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct VerifyPasswordInput {
    // Missing and null both mean "no password", which simply fails to verify.
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ChangePasswordInput {
    #[serde(default)]
    old_password: Option<String>,
    #[serde(default)]
    new_password: Option<String>,
}

/// Check the admin password and open a session on success.
pub(super) async fn verify_password(state: &AppState, input: VerifyPasswordInput) -> ActionResult {
    let password = input.password.unwrap_or_default();
    if !state.credentials().verify(&password).await? {
        tracing::warn!(action = %Action::VerifyPassword, "Admin login failed");
        return Ok(Json(json!({ "success": false })));
    }

    let token = state.sessions().issue().await?;
    tracing::info!(action = %Action::VerifyPassword, "Admin session issued");
    Ok(Json(json!({ "success": true, "token": token })))
}

/// The dispatcher already checked the session.
pub(super) fn verify_token() -> Json<serde_json::Value> {
    Json(json!({ "valid": true }))
}

pub(super) async fn logout(state: &AppState, token: &BearerToken) -> ActionResult {
    if let Some(token) = token.0.as_deref() {
        state.sessions().revoke(token).await?;
    }
    tracing::info!(action = %Action::Logout, "Admin session revoked");
    Ok(Json(json!({ "success": true })))
}

pub(super) async fn change_password(state: &AppState, input: ChangePasswordInput) -> ActionResult {
    state
        .credentials()
        .change_password(
            input.old_password.as_deref().unwrap_or_default(),
            input.new_password.as_deref().unwrap_or_default(),
        )
        .await?;

    tracing::info!(action = %Action::ChangePassword, "Admin password changed");
    Ok(Json(json!({ "success": true })))
}

//! Bearer-token authentication for admin actions.
//!
//! Whether a request needs a session depends on the action named in its
//! body, so the token is extracted up front and checked by the dispatcher
//! once the action is known.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::error::ApiError;
use crate::state::AppState;

/// The `Authorization: Bearer <token>` value, if one was sent.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(extract_bearer_token(&parts.headers).map(str::to_owned)))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

/// Require a live admin session.
///
/// # Errors
///
/// Returns `Unauthorized` for a missing, unknown or expired token, or a
/// session store failure.
pub async fn require_session(state: &AppState, token: &BearerToken) -> Result<(), ApiError> {
    let Some(token) = token.0.as_deref() else {
        return Err(ApiError::Unauthorized);
    };

    if state.sessions().is_valid(token).await? {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

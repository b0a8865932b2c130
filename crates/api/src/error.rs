//! Unified error handling for the action router.
//!
//! Every failure leaves the server as JSON with an `error` string. Client
//! errors carry their message; server errors are captured in Sentry, logged
//! with full detail, and reach the client only as "Internal server error".

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{
    CredentialError, OrderRejection, SessionError, StatusChangeError, StorageError,
};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or invalid input.
    #[error("{0}")]
    Validation(String),

    /// A business rule refused the request. Rendered as
    /// `{"success": false, "error": ...}`.
    #[error("{0}")]
    Rejected(String),

    /// Missing, unknown or expired bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Referenced entity does not exist. The message names the id.
    #[error("{0}")]
    NotFound(String),

    /// Action name is not recognised.
    #[error("Unknown action")]
    UnknownAction,

    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Media storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map a repository `NotFound` to a client error naming the entity.
    pub fn not_found(
        entity: &str,
        id: impl std::fmt::Display,
    ) -> impl FnOnce(RepositoryError) -> Self {
        let message = format!("{entity} not found: {id}");
        move |err| match err {
            RepositoryError::NotFound => Self::NotFound(message),
            other => Self::Repository(other),
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Rejected(_) | Self::NotFound(_) | Self::UnknownAction => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Repository(_) | Self::Storage(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let body = match &self {
            Self::Rejected(message) => json!({ "success": false, "error": message }),
            _ if self.is_server_error() => json!({ "error": "Internal server error" }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<OrderRejection> for ApiError {
    fn from(err: OrderRejection) -> Self {
        match err {
            OrderRejection::Repository(e) => Self::Repository(e),
            rejection => Self::Rejected(rejection.to_string()),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::IncorrectPassword | CredentialError::PasswordTooShort => {
                Self::Rejected(err.to_string())
            }
            CredentialError::NotConfigured => Self::Internal(err.to_string()),
            CredentialError::Repository(e) => Self::Repository(e),
        }
    }
}

impl From<StatusChangeError> for ApiError {
    fn from(err: StatusChangeError) -> Self {
        match err {
            StatusChangeError::NotFound(_) => Self::NotFound(err.to_string()),
            StatusChangeError::InvalidTransition { .. } => Self::Validation(err.to_string()),
            StatusChangeError::Repository(e) => Self::Repository(e),
        }
    }
}

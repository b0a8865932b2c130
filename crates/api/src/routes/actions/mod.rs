//! `POST /admin` action router.
//!
//! Every admin operation, plus checkout and login, goes through one endpoint
//! taking `{"action": "...", "data": {...}}`. The action name is parsed into
//! [`Action`] first, so an unknown name is rejected before anything else
//! runs; protected actions then require a live session before their handler
//! sees the input.

mod auth;
mod drops;
mod media;
mod orders;
mod products;

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::{BearerToken, require_session};
use crate::state::AppState;

/// Handler result: a JSON payload or an [`ApiError`].
pub type ActionResult = Result<Json<Value>, ApiError>;

/// Request envelope. `data` may be omitted.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Every operation the router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    VerifyPassword,
    VerifyToken,
    Logout,
    ChangePassword,
    SubmitOrder,
    GetProducts,
    AddProduct,
    UpdateProduct,
    DeleteProduct,
    GetDrops,
    CreateDrop,
    UpdateDrop,
    CancelDrop,
    CompleteDrop,
    GetOrders,
    UpdateOrderStatus,
    UploadMedia,
    CleanupSoldOut,
}

impl Action {
    pub const ALL: [Self; 18] = [
        Self::VerifyPassword,
        Self::VerifyToken,
        Self::Logout,
        Self::ChangePassword,
        Self::SubmitOrder,
        Self::GetProducts,
        Self::AddProduct,
        Self::UpdateProduct,
        Self::DeleteProduct,
        Self::GetDrops,
        Self::CreateDrop,
        Self::UpdateDrop,
        Self::CancelDrop,
        Self::CompleteDrop,
        Self::GetOrders,
        Self::UpdateOrderStatus,
        Self::UploadMedia,
        Self::CleanupSoldOut,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VerifyPassword => "verify_password",
            Self::VerifyToken => "verify_token",
            Self::Logout => "logout",
            Self::ChangePassword => "change_password",
            Self::SubmitOrder => "submit_order",
            Self::GetProducts => "get_products",
            Self::AddProduct => "add_product",
            Self::UpdateProduct => "update_product",
            Self::DeleteProduct => "delete_product",
            Self::GetDrops => "get_drops",
            Self::CreateDrop => "create_drop",
            Self::UpdateDrop => "update_drop",
            Self::CancelDrop => "cancel_drop",
            Self::CompleteDrop => "complete_drop",
            Self::GetOrders => "get_orders",
            Self::UpdateOrderStatus => "update_order_status",
            Self::UploadMedia => "upload_media",
            Self::CleanupSoldOut => "cleanup_sold_out",
        }
    }

    /// Only login and checkout are open to anonymous callers.
    #[must_use]
    pub const fn requires_auth(self) -> bool {
        !matches!(self, Self::VerifyPassword | Self::SubmitOrder)
    }
}

impl std::str::FromStr for Action {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or(ApiError::UnknownAction)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deserialize an action's `data` into its typed input.
fn input<T: DeserializeOwned>(data: Value) -> Result<T, ApiError> {
    serde_json::from_value(data).map_err(|e| ApiError::Validation(format!("invalid input: {e}")))
}

/// `{"id": ...}` input shared by the delete/cancel/complete actions.
#[derive(Debug, Deserialize)]
struct IdInput<T> {
    id: T,
}

/// Handle `POST /admin`.
pub async fn dispatch(
    State(state): State<AppState>,
    token: BearerToken,
    body: Bytes,
) -> ActionResult {
    let request: ActionRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("invalid request body: {e}")))?;
    let action: Action = request.action.parse()?;

    if action.requires_auth() {
        require_session(&state, &token).await?;
    }

    let data = match request.data {
        Some(Value::Null) | None => Value::Object(serde_json::Map::new()),
        Some(data) => data,
    };

    tracing::debug!(action = %action, "Dispatching admin action");

    match action {
        Action::VerifyPassword => auth::verify_password(&state, input(data)?).await,
        Action::VerifyToken => Ok(auth::verify_token()),
        Action::Logout => auth::logout(&state, &token).await,
        Action::ChangePassword => auth::change_password(&state, input(data)?).await,
        Action::SubmitOrder => orders::submit_order(&state, input(data)?).await,
        Action::GetOrders => orders::get_orders(&state).await,
        Action::UpdateOrderStatus => orders::update_order_status(&state, input(data)?).await,
        Action::GetProducts => products::get_products(&state).await,
        Action::AddProduct => products::add_product(&state, input(data)?).await,
        Action::UpdateProduct => products::update_product(&state, input(data)?).await,
        Action::DeleteProduct => products::delete_product(&state, input(data)?).await,
        Action::CleanupSoldOut => products::cleanup_sold_out(&state).await,
        Action::GetDrops => drops::get_drops(&state).await,
        Action::CreateDrop => drops::create_drop(&state, input(data)?).await,
        Action::UpdateDrop => drops::update_drop(&state, input(data)?).await,
        Action::CancelDrop => drops::cancel_drop(&state, input(data)?).await,
        Action::CompleteDrop => drops::complete_drop(&state, input(data)?).await,
        Action::UploadMedia => media::upload_media(&state, input(data)?).await,
    }
}

/// Handle `OPTIONS /admin` (CORS preflight). Headers come from the CORS
/// middleware.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

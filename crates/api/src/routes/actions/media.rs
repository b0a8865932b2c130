//! Signed uploads into the media bucket.

use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::{Action, ActionResult};
use crate::error::ApiError;
use crate::services::storage::{extension_for, upload_path};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UploadMediaInput {
    #[serde(default)]
    file_name: String,
    #[serde(default)]
    content_type: String,
}

/// Sign an upload to a fresh path; the object name ignores the client's
/// file name.
pub(super) async fn upload_media(state: &AppState, input: UploadMediaInput) -> ActionResult {
    let extension = extension_for(&input.content_type).ok_or_else(|| {
        ApiError::Validation(format!("unsupported content type: {}", input.content_type))
    })?;

    let upload = state
        .storage()
        .create_signed_upload(&upload_path(extension))
        .await?;

    tracing::info!(
        action = %Action::UploadMedia,
        entity_id = %upload.path,
        file_name = %input.file_name,
        "Media upload signed"
    );
    Ok(Json(json!(upload)))
}

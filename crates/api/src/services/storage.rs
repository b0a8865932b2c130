//! Supabase Storage client for product and drop media.
//!
//! Uploads never pass through this server: the admin client asks for a signed
//! upload URL and PUTs the file straight to storage. This module only signs
//! uploads and deletes objects.

use async_trait::async_trait;
use mockall::automock;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Folder inside the bucket that receives admin uploads.
const UPLOAD_PREFIX: &str = "uploads";

/// Content types accepted by `upload_media`, with the file extension used
/// for the stored object.
const ALLOWED_MEDIA_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("video/mp4", "mp4"),
];

/// Errors that can occur when talking to the storage API.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// `SUPABASE_URL` / `SUPABASE_SERVICE_ROLE_KEY` are not set.
    #[error("media storage is not configured")]
    NotConfigured,
}

/// A one-shot upload target handed to the admin client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUpload {
    pub signed_url: String,
    pub path: String,
}

#[automock]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Sign an upload for `path` inside the media bucket.
    async fn create_signed_upload(&self, path: &str) -> Result<SignedUpload, StorageError>;

    /// Delete objects by path. Missing objects are not an error.
    async fn remove(&self, paths: Vec<String>) -> Result<(), StorageError>;
}

/// Extension for an allowed upload content type.
#[must_use]
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_MEDIA_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

/// A fresh object path for an upload of the given extension.
#[must_use]
pub fn upload_path(extension: &str) -> String {
    format!("{UPLOAD_PREFIX}/{}.{extension}", Uuid::new_v4())
}

/// Object path for a public media URL in `bucket`, if the URL points there.
///
/// `https://x.supabase.co/storage/v1/object/public/media/uploads/a.jpg`
/// yields `uploads/a.jpg`.
#[must_use]
pub fn object_path(public_url: &str, bucket: &str) -> Option<String> {
    let marker = format!("storage/v1/object/public/{bucket}/");
    let (_, path) = public_url.split_once(&marker)?;
    let path = path.split(['?', '#']).next().unwrap_or_default();
    (!path.is_empty()).then(|| path.to_string())
}

// =============================================================================
// Supabase
// =============================================================================

/// Storage API client authenticated with the service role key.
#[derive(Clone)]
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
}

#[derive(Debug, Deserialize)]
struct SignedUploadResponse {
    url: String,
}

impl SupabaseStorage {
    /// Create a new storage client for `bucket`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorageConfig, bucket: &str) -> Result<Self, StorageError> {
        let key = config.service_role_key.expose_secret();
        let mut headers = HeaderMap::new();

        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| StorageError::Parse(format!("Invalid service role key: {e}")))?,
        );
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| StorageError::Parse(format!("Invalid service role key: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            bucket: bucket.to_string(),
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StorageError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl std::fmt::Debug for SupabaseStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseStorage")
            .field("base_url", &self.base_url)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MediaStorage for SupabaseStorage {
    async fn create_signed_upload(&self, path: &str) -> Result<SignedUpload, StorageError> {
        let url = format!(
            "{}/storage/v1/object/upload/sign/{}/{path}",
            self.base_url, self.bucket
        );

        let response = self.client.post(&url).send().await?;
        let signed: SignedUploadResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StorageError::Parse(e.to_string()))?;

        Ok(SignedUpload {
            signed_url: format!("{}/storage/v1{}", self.base_url, signed.url),
            path: path.to_string(),
        })
    }

    async fn remove(&self, paths: Vec<String>) -> Result<(), StorageError> {
        if paths.is_empty() {
            return Ok(());
        }

        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let body = serde_json::json!({ "prefixes": paths });

        let response = self.client.delete(&url).json(&body).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Stand-in used when storage is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStorage;

#[async_trait]
impl MediaStorage for DisabledStorage {
    async fn create_signed_upload(&self, _path: &str) -> Result<SignedUpload, StorageError> {
        Err(StorageError::NotConfigured)
    }

    async fn remove(&self, _paths: Vec<String>) -> Result<(), StorageError> {
        Err(StorageError::NotConfigured)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_allowed_types() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("video/mp4"), Some("mp4"));
    }

    #[test]
    fn test_extension_for_rejects_others() {
        assert_eq!(extension_for("application/pdf"), None);
        assert_eq!(extension_for("IMAGE/PNG"), None);
        assert_eq!(extension_for(""), None);
    }

    #[test]
    fn test_upload_path_shape() {
        let path = upload_path("webp");
        let name = path.strip_prefix("uploads/").unwrap();
        let stem = name.strip_suffix(".webp").unwrap();
        assert!(Uuid::parse_str(stem).is_ok());
    }

    #[test]
    fn test_object_path_in_bucket() {
        let url = "https://abc.supabase.co/storage/v1/object/public/media/uploads/a.jpg";
        assert_eq!(object_path(url, "media").as_deref(), Some("uploads/a.jpg"));
    }

    #[test]
    fn test_object_path_strips_query() {
        let url = "https://abc.supabase.co/storage/v1/object/public/media/uploads/a.jpg?v=2";
        assert_eq!(object_path(url, "media").as_deref(), Some("uploads/a.jpg"));
    }

    #[test]
    fn test_object_path_outside_bucket() {
        assert_eq!(object_path("https://cdn.example.net/a.jpg", "media"), None);
        let other = "https://abc.supabase.co/storage/v1/object/public/avatars/a.jpg";
        assert_eq!(object_path(other, "media"), None);
    }

    #[test]
    fn test_signed_upload_serializes_camel_case() {
        let upload = SignedUpload {
            signed_url: "https://s/u".to_string(),
            path: "uploads/x.png".to_string(),
        };
        let json = serde_json::to_value(&upload).unwrap();
        assert_eq!(json["signedUrl"], "https://s/u");
        assert_eq!(json["path"], "uploads/x.png");
    }

    #[tokio::test]
    async fn test_disabled_storage_refuses() {
        let err = DisabledStorage.create_signed_upload("uploads/a.jpg").await;
        assert!(matches!(err, Err(StorageError::NotConfigured)));
    }
}

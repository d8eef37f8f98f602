//! Decoding of the update manifest returned by the check endpoint.

use crate::error::UpdateError;
use crate::model::Update;

/// Turns a check response body into an [`Update`].
pub trait UpdateParser: Send + Sync {
    fn parse(&self, body: &str) -> Result<Update, UpdateError>;
}

/// Parses the JSON form of [`Update`] and rejects manifests that can't be downloaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonUpdateParser;

impl UpdateParser for JsonUpdateParser {
    fn parse(&self, body: &str) -> Result<Update, UpdateError> {
        let update: Update =
            serde_json::from_str(body).map_err(|e| UpdateError::Manifest(e.to_string()))?;
        if update.version_name.trim().is_empty() {
            return Err(UpdateError::Manifest("empty version_name".to_string()));
        }
        url::Url::parse(&update.download_url).map_err(|e| {
            UpdateError::Manifest(format!("download_url {:?}: {}", update.download_url, e))
        })?;
        Ok(update)
    }
}

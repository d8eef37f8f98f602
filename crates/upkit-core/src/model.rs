//! Update descriptor produced by a check and consumed by a download.

use serde::{Deserialize, Serialize};

/// Immutable description of an available update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic build number compared against the running version.
    pub version_code: u64,
    /// Human-readable version; also keys the cache file.
    pub version_name: String,
    pub download_url: String,
    /// Release notes shown to the user.
    #[serde(default)]
    pub content: String,
    /// Expected SHA-256 of the package, lowercase hex.
    #[serde(default)]
    pub sha256: Option<String>,
    /// Expected size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// A forced update cannot be ignored and is downloaded without asking.
    #[serde(default)]
    pub force: bool,
}

impl Update {
    /// Minimal descriptor; the rest can be set field by field.
    pub fn new(
        version_code: u64,
        version_name: impl Into<String>,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            version_code,
            version_name: version_name.into(),
            download_url: download_url.into(),
            content: String::new(),
            sha256: None,
            size: None,
            force: false,
        }
    }
}

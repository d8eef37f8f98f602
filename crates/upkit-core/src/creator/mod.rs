//! Cache file placement for downloaded update packages.

mod sanitize;

use std::path::PathBuf;

use sha2::{Digest, Sha256};

pub use sanitize::sanitize_version;

/// Maps a version name to the path its package is (or will be) cached at.
pub trait FileCreator: Send + Sync {
    /// `None` when no location can be derived for this version.
    fn create(&self, version_name: &str) -> Option<PathBuf>;
}

/// Places packages as `<dir>/update-<version>.<extension>`.
///
/// A version name that is not already file-name safe gets a short digest of
/// the original name appended, so `1.0.` and `_1.0` never share a file.
#[derive(Debug, Clone)]
pub struct CacheDirFileCreator {
    dir: PathBuf,
    extension: String,
}

impl CacheDirFileCreator {
    pub const DEFAULT_EXTENSION: &'static str = "pkg";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: Self::DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }
}

impl FileCreator for CacheDirFileCreator {
    fn create(&self, version_name: &str) -> Option<PathBuf> {
        let mut version = sanitize_version(version_name);
        if version.is_empty() {
            return None;
        }
        if version != version_name {
            let digest = hex::encode(Sha256::digest(version_name.as_bytes()));
            version = format!("{}-{}", version, &digest[..8]);
        }
        let name = if self.extension.is_empty() {
            format!("update-{}", version)
        } else {
            format!("update-{}.{}", version, self.extension)
        };
        Some(self.dir.join(name))
    }
}

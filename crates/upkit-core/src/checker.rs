//! Integrity check of a package against its update descriptor.

use std::io;
use std::path::{Path, PathBuf};

use crate::checksum;
use crate::model::Update;

/// Why a package file was rejected.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    #[error("{} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("size mismatch: expected {expected} bytes, found {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("sha256 mismatch: expected {expected}, found {actual}")]
    DigestMismatch { expected: String, actual: String },
}

impl IntegrityError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            IntegrityError::Missing(path.to_path_buf())
        } else {
            IntegrityError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Validates a package file for an update.
pub trait FileChecker: Send + Sync {
    fn check(&self, update: &Update, path: &Path) -> Result<(), IntegrityError>;
}

/// Compares the file against the descriptor's `size` and `sha256`, whichever are present.
///
/// A descriptor with neither accepts any existing regular file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestFileChecker;

impl FileChecker for DigestFileChecker {
    fn check(&self, update: &Update, path: &Path) -> Result<(), IntegrityError> {
        let meta = std::fs::metadata(path).map_err(|e| IntegrityError::from_io(path, e))?;
        if !meta.is_file() {
            return Err(IntegrityError::Missing(path.to_path_buf()));
        }

        if let Some(expected) = update.size {
            if meta.len() != expected {
                return Err(IntegrityError::SizeMismatch {
                    expected,
                    actual: meta.len(),
                });
            }
        }

        if let Some(expected) = update.sha256.as_deref() {
            let actual = checksum::sha256_path(path).map_err(|e| IntegrityError::from_io(path, e))?;
            if !checksum::digest_eq(expected, &actual) {
                return Err(IntegrityError::DigestMismatch {
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        Ok(())
    }
}

//! Hand-off of a verified package to whatever installs it.

use std::path::Path;

use crate::error::UpdateError;
use crate::model::Update;

/// Installs a verified package. Only consulted when the strategy enables auto-install.
pub trait Installer: Send + Sync {
    fn install(&self, update: &Update, file: &Path) -> Result<(), UpdateError>;
}

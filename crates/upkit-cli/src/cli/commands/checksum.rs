//! `upkit checksum` – compute SHA-256 of a file.

use anyhow::{Context, Result};
use std::path::Path;
use upkit_core::checksum;

/// Compute and print SHA-256 of the given file.
pub fn run_checksum(path: &Path) -> Result<()> {
    let digest =
        checksum::sha256_path(path).with_context(|| format!("read {}", path.display()))?;
    println!("{}  {}", digest, path.display());
    Ok(())
}

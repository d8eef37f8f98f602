//! `upkit verify` – check a package against its manifest.

use anyhow::{Context, Result};
use std::path::Path;
use upkit_core::checker::{DigestFileChecker, FileChecker};

use super::read_manifest;

pub fn run_verify(file: &Path, manifest: &Path) -> Result<()> {
    let update = read_manifest(manifest)?;
    if update.sha256.is_none() && update.size.is_none() {
        tracing::warn!("manifest has neither sha256 nor size; only existence is checked");
    }
    DigestFileChecker
        .check(&update, file)
        .with_context(|| format!("verify {} against {}", file.display(), update.version_name))?;
    println!("OK  {}  {}", update.version_name, file.display());
    Ok(())
}

//! CLI for upkit.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use upkit_core::config;

use commands::{run_check, run_checksum, run_download, run_verify};

/// Top-level CLI for upkit.
#[derive(Debug, Parser)]
#[command(name = "upkit")]
#[command(about = "upkit: check for updates and fetch verified packages", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/upkit/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Check the manifest endpoint for a newer version.
    Check {
        /// Manifest URL (overrides check_url from the config).
        #[arg(long)]
        url: Option<String>,
        /// Version code of the running build (overrides current_version_code).
        #[arg(long, value_name = "CODE")]
        current_version: Option<u64>,
        /// Download the update right away if one is found.
        #[arg(long)]
        download: bool,
    },

    /// Download the package described by a manifest file, reusing a verified cached copy.
    Download {
        /// Path to the JSON update manifest.
        manifest: PathBuf,
    },

    /// Verify a package file against a manifest (size and SHA-256).
    Verify {
        /// Path to the package.
        file: PathBuf,
        /// Path to the JSON update manifest.
        #[arg(long)]
        manifest: PathBuf,
    },

    /// Compute SHA-256 of a file (e.g. to fill in a manifest).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Check {
                url,
                current_version,
                download,
            } => run_check(cfg, url, current_version, download).await?,
            CliCommand::Download { manifest } => run_download(cfg, &manifest).await?,
            CliCommand::Verify { file, manifest } => run_verify(&file, &manifest)?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;

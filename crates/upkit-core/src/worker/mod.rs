//! Check and download workers: the units of work the executor runs.
//!
//! Workers are stateless with respect to concurrency; which kind is running
//! is tracked by the executor's slots, not by the worker.

mod download;
mod http;
mod parser;

use std::fmt;
use std::path::Path;

use crate::builder::UpdateConfig;
use crate::error::UpdateError;
use crate::model::Update;

pub use download::CurlDownloadWorker;
pub use http::HttpCheckWorker;
pub use parser::{JsonUpdateParser, UpdateParser};

/// The two task kinds; at most one of each runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Check,
    Download,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Check => write!(f, "check"),
            TaskKind::Download => write!(f, "download"),
        }
    }
}

/// What a successful check found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Available(Update),
    UpToDate,
}

/// Receives byte counts while a package downloads.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, current: u64, total: Option<u64>);
}

/// Queries for an available update.
pub trait CheckWorker: Send + Sync {
    fn check(&self, config: &UpdateConfig) -> Result<CheckOutcome, UpdateError>;
}

/// Retrieves the package for `update` into `target`.
///
/// On success the complete file must be at `target`; verification is done by the caller.
pub trait DownloadWorker: Send + Sync {
    fn download(
        &self,
        update: &Update,
        config: &UpdateConfig,
        target: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<(), UpdateError>;
}

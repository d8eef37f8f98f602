//! upkit core: single-flight update checks and cached package downloads.
//!
//! [`Updater`](updater::Updater) is the entry point. It builds default callbacks,
//! short-circuits on a verified cached package, and hands bound workers to an
//! [`Executor`](executor::Executor) that runs at most one check and one download.

pub mod config;
pub mod logging;

pub mod builder;
pub mod callback;
pub mod checker;
pub mod checksum;
pub mod creator;
pub mod error;
pub mod executor;
pub mod install;
pub mod model;
pub mod storage;
pub mod updater;
pub mod worker;

pub use builder::{UpdateBuilder, UpdateConfig};
pub use error::UpdateError;
pub use model::Update;
pub use updater::{DownloadDispatch, Updater};

#[cfg(test)]
mod test_support;

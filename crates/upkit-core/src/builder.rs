//! Per-request bundle of collaborators, assembled by [`UpdateBuilder`].

use std::sync::Arc;

use crate::callback::{CheckListener, DownloadListener, LogListener};
use crate::checker::{DigestFileChecker, FileChecker};
use crate::config::{StrategyConfig, UpkitConfig};
use crate::creator::{CacheDirFileCreator, FileCreator};
use crate::error::UpdateError;
use crate::install::Installer;
use crate::model::Update;
use crate::worker::{
    CheckOutcome, CheckWorker, CurlDownloadWorker, DownloadWorker, HttpCheckWorker, UpdateParser,
};

/// Everything a check or download request needs. Read-only once built.
pub struct UpdateConfig {
    settings: UpkitConfig,
    check_worker: Arc<dyn CheckWorker>,
    download_worker: Arc<dyn DownloadWorker>,
    file_checker: Arc<dyn FileChecker>,
    file_creator: Arc<dyn FileCreator>,
    check_listener: Arc<dyn CheckListener>,
    download_listener: Arc<dyn DownloadListener>,
    installer: Option<Arc<dyn Installer>>,
}

impl UpdateConfig {
    pub fn settings(&self) -> &UpkitConfig {
        &self.settings
    }

    pub fn strategy(&self) -> StrategyConfig {
        self.settings.strategy
    }

    pub fn check_worker(&self) -> Arc<dyn CheckWorker> {
        Arc::clone(&self.check_worker)
    }

    pub fn download_worker(&self) -> Arc<dyn DownloadWorker> {
        Arc::clone(&self.download_worker)
    }

    pub fn file_checker(&self) -> &dyn FileChecker {
        self.file_checker.as_ref()
    }

    pub fn file_creator(&self) -> &dyn FileCreator {
        self.file_creator.as_ref()
    }

    pub fn check_listener(&self) -> &dyn CheckListener {
        self.check_listener.as_ref()
    }

    pub fn download_listener(&self) -> &dyn DownloadListener {
        self.download_listener.as_ref()
    }

    pub fn installer(&self) -> Option<&dyn Installer> {
        self.installer.as_deref()
    }

    /// Forced updates are never ignored.
    pub fn is_ignored(&self, update: &Update) -> bool {
        !update.force
            && self
                .settings
                .ignored_versions
                .iter()
                .any(|v| v == &update.version_name)
    }
}

/// Stand-in check worker when no `check_url` is configured.
struct UnconfiguredCheckWorker;

impl CheckWorker for UnconfiguredCheckWorker {
    fn check(&self, _config: &UpdateConfig) -> Result<CheckOutcome, UpdateError> {
        Err(UpdateError::InvalidConfig(
            "check_url is not configured".to_string(),
        ))
    }
}

/// Assembles an [`UpdateConfig`], filling unset collaborators with defaults
/// derived from [`UpkitConfig`].
pub struct UpdateBuilder {
    settings: UpkitConfig,
    check_worker: Option<Arc<dyn CheckWorker>>,
    parser: Option<Arc<dyn UpdateParser>>,
    download_worker: Option<Arc<dyn DownloadWorker>>,
    file_checker: Option<Arc<dyn FileChecker>>,
    file_creator: Option<Arc<dyn FileCreator>>,
    check_listener: Option<Arc<dyn CheckListener>>,
    download_listener: Option<Arc<dyn DownloadListener>>,
    installer: Option<Arc<dyn Installer>>,
}

impl UpdateBuilder {
    pub fn new(settings: UpkitConfig) -> Self {
        Self {
            settings,
            check_worker: None,
            parser: None,
            download_worker: None,
            file_checker: None,
            file_creator: None,
            check_listener: None,
            download_listener: None,
            installer: None,
        }
    }

    pub fn check_worker(mut self, worker: Arc<dyn CheckWorker>) -> Self {
        self.check_worker = Some(worker);
        self
    }

    /// Manifest parser for the default HTTP check worker. Ignored when a
    /// custom check worker is set.
    pub fn parser(mut self, parser: Arc<dyn UpdateParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn download_worker(mut self, worker: Arc<dyn DownloadWorker>) -> Self {
        self.download_worker = Some(worker);
        self
    }

    pub fn file_checker(mut self, checker: Arc<dyn FileChecker>) -> Self {
        self.file_checker = Some(checker);
        self
    }

    pub fn file_creator(mut self, creator: Arc<dyn FileCreator>) -> Self {
        self.file_creator = Some(creator);
        self
    }

    pub fn check_listener(mut self, listener: Arc<dyn CheckListener>) -> Self {
        self.check_listener = Some(listener);
        self
    }

    pub fn download_listener(mut self, listener: Arc<dyn DownloadListener>) -> Self {
        self.download_listener = Some(listener);
        self
    }

    pub fn installer(mut self, installer: Arc<dyn Installer>) -> Self {
        self.installer = Some(installer);
        self
    }

    pub fn strategy(mut self, strategy: StrategyConfig) -> Self {
        self.settings.strategy = strategy;
        self
    }

    /// Fails fast when a default collaborator can't be derived (unparsable
    /// check URL, no cache dir). A config without `check_url` can still
    /// download; its checks fail with `InvalidConfig`.
    pub fn build(self) -> Result<Arc<UpdateConfig>, UpdateError> {
        let settings = self.settings;

        let check_worker = match (self.check_worker, settings.check_url.as_deref()) {
            (Some(worker), _) => worker,
            (None, Some(url)) => {
                url::Url::parse(url).map_err(|e| {
                    UpdateError::InvalidConfig(format!("check_url {:?}: {}", url, e))
                })?;
                let mut worker = HttpCheckWorker::new(url, settings.current_version_code);
                if let Some(parser) = self.parser {
                    worker = worker.with_parser(parser);
                }
                Arc::new(worker) as Arc<dyn CheckWorker>
            }
            (None, None) => Arc::new(UnconfiguredCheckWorker) as Arc<dyn CheckWorker>,
        };

        let file_creator = match self.file_creator {
            Some(creator) => creator,
            None => {
                let dir = settings.resolved_cache_dir().map_err(|e| {
                    UpdateError::InvalidConfig(format!("cache dir: {:#}", e))
                })?;
                Arc::new(CacheDirFileCreator::new(dir)) as Arc<dyn FileCreator>
            }
        };

        Ok(Arc::new(UpdateConfig {
            check_worker,
            download_worker: self
                .download_worker
                .unwrap_or_else(|| Arc::new(CurlDownloadWorker) as Arc<dyn DownloadWorker>),
            file_checker: self
                .file_checker
                .unwrap_or_else(|| Arc::new(DigestFileChecker) as Arc<dyn FileChecker>),
            file_creator,
            check_listener: self
                .check_listener
                .unwrap_or_else(|| Arc::new(LogListener) as Arc<dyn CheckListener>),
            download_listener: self
                .download_listener
                .unwrap_or_else(|| Arc::new(LogListener) as Arc<dyn DownloadListener>),
            installer: self.installer,
            settings,
        }))
    }
}

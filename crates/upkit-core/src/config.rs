use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// HTTP limits for the default check and download workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Upper bound on a whole transfer (check request or package download).
    pub timeout_secs: u64,
    /// Abort when slower than this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit: u32,
    pub low_speed_time_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 3600,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn low_speed_time(&self) -> Duration {
        Duration::from_secs(self.low_speed_time_secs)
    }
}

/// What the default callbacks do on their own after a task completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Start the download as soon as a check finds an update.
    #[serde(default)]
    pub auto_download: bool,
    /// Hand a verified package straight to the installer.
    #[serde(default)]
    pub auto_install: bool,
}

/// Global configuration loaded from `~/.config/upkit/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpkitConfig {
    /// Endpoint returning the update manifest (JSON). Required by the default check worker.
    #[serde(default)]
    pub check_url: Option<String>,
    /// Version code of the running build; manifests at or below it mean "up to date".
    #[serde(default)]
    pub current_version_code: u64,
    /// Where downloaded packages are cached. Defaults to `~/.cache/upkit`.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Version names the user chose to skip. Forced updates ignore this list.
    #[serde(default)]
    pub ignored_versions: Vec<String>,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl UpkitConfig {
    /// Configured cache dir, or the XDG cache home for `upkit`.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("upkit")?;
        Ok(xdg_dirs.get_cache_home())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("upkit")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<UpkitConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: UpkitConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<UpkitConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = UpkitConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

//! Default check worker: fetch the manifest over HTTP with libcurl.

use std::sync::Arc;

use crate::builder::UpdateConfig;
use crate::config::HttpConfig;
use crate::error::UpdateError;

use super::parser::{JsonUpdateParser, UpdateParser};
use super::{CheckOutcome, CheckWorker};

const MAX_MANIFEST_BYTES: usize = 1024 * 1024;

/// Connection limits shared by the check and download workers.
pub(super) fn easy_with_limits(
    url: &str,
    http: &HttpConfig,
) -> Result<curl::easy::Easy, UpdateError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(http.connect_timeout())?;
    easy.timeout(http.timeout())?;
    easy.low_speed_limit(http.low_speed_limit)?;
    easy.low_speed_time(http.low_speed_time())?;
    Ok(easy)
}

pub(super) fn ensure_success(easy: &mut curl::easy::Easy, url: &str) -> Result<(), UpdateError> {
    let status = easy.response_code()?;
    if !(200..300).contains(&status) {
        return Err(UpdateError::HttpStatus {
            url: url.to_string(),
            status,
        });
    }
    Ok(())
}

/// GETs `url` and returns the body as text.
fn fetch_text(url: &str, http: &HttpConfig) -> Result<String, UpdateError> {
    let mut body = Vec::new();
    let mut easy = easy_with_limits(url, http)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if body.len() + data.len() > MAX_MANIFEST_BYTES {
                // Returning a short count aborts the transfer.
                return Ok(0);
            }
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    ensure_success(&mut easy, url)?;
    String::from_utf8(body).map_err(|e| UpdateError::Manifest(format!("body is not UTF-8: {}", e)))
}

/// Fetches a manifest and compares its version code with the running build.
#[derive(Clone)]
pub struct HttpCheckWorker {
    url: String,
    current_version_code: u64,
    parser: Arc<dyn UpdateParser>,
}

impl HttpCheckWorker {
    pub fn new(url: impl Into<String>, current_version_code: u64) -> Self {
        Self {
            url: url.into(),
            current_version_code,
            parser: Arc::new(JsonUpdateParser),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn UpdateParser>) -> Self {
        self.parser = parser;
        self
    }
}

impl std::fmt::Debug for HttpCheckWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCheckWorker")
            .field("url", &self.url)
            .field("current_version_code", &self.current_version_code)
            .finish_non_exhaustive()
    }
}

impl CheckWorker for HttpCheckWorker {
    fn check(&self, config: &UpdateConfig) -> Result<CheckOutcome, UpdateError> {
        tracing::debug!(url = %self.url, "fetching update manifest");
        let body = fetch_text(&self.url, &config.settings().http)?;
        let update = self.parser.parse(&body)?;
        if update.version_code > self.current_version_code {
            tracing::info!(
                version = %update.version_name,
                code = update.version_code,
                "update available"
            );
            Ok(CheckOutcome::Available(update))
        } else {
            tracing::debug!(
                remote = update.version_code,
                current = self.current_version_code,
                "already up to date"
            );
            Ok(CheckOutcome::UpToDate)
        }
    }
}

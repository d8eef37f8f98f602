//! Default download worker: single-stream GET into a `.part` file.

use std::path::Path;

use crate::builder::UpdateConfig;
use crate::error::UpdateError;
use crate::model::Update;
use crate::storage::PartFile;

use super::http::{easy_with_limits, ensure_success};
use super::{DownloadWorker, ProgressSink};

/// Downloads `update.download_url` sequentially, renaming onto the target when complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlDownloadWorker;

impl DownloadWorker for CurlDownloadWorker {
    fn download(
        &self,
        update: &Update,
        config: &UpdateConfig,
        target: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<(), UpdateError> {
        let url = update.download_url.as_str();
        let mut part = PartFile::create(target).map_err(|e| UpdateError::io(target, e))?;
        let mut write_err: Option<std::io::Error> = None;

        let result = (|| {
            let mut easy = easy_with_limits(url, &config.settings().http)?;
            {
                let mut transfer = easy.transfer();
                transfer.write_function(|data| match part.write_chunk(data) {
                    Ok(()) => {
                        progress.on_progress(part.written(), update.size);
                        Ok(data.len())
                    }
                    Err(e) => {
                        tracing::warn!("package write failed: {}", e);
                        write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                })?;
                transfer.perform()?;
            }
            ensure_success(&mut easy, url)
        })();

        if let Some(e) = write_err {
            let temp = part.temp_path().to_path_buf();
            part.discard();
            return Err(UpdateError::io(temp, e));
        }
        if let Err(e) = result {
            part.discard();
            return Err(e);
        }

        let written = part.written();
        part.finalize(target).map_err(|e| UpdateError::io(target, e))?;
        tracing::debug!(path = %target.display(), bytes = written, "package downloaded");
        Ok(())
    }
}

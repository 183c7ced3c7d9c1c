//! Transcript log files.
//!
//! Each result is appended to `<label>_<YYYYMMDD>_<HHMMSS>.log` in the log
//! directory, timestamped in a fixed UTC offset.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use log::debug;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::OutputError;
use crate::task::TaskResult;

/// Writes transcripts to timestamped log files.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    offset: FixedOffset,
}

impl OutputWriter {
    pub fn new(dir: impl AsRef<Path>, offset: FixedOffset) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            offset,
        }
    }

    /// Log file name for `label` at time `at`.
    pub fn file_name(label: &str, at: &DateTime<FixedOffset>) -> String {
        format!("{label}_{}.log", at.format("%Y%m%d_%H%M%S"))
    }

    /// Current wall-clock time in the writer's offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Append a result's transcript to its log file, stamped with now.
    pub async fn write(&self, result: &TaskResult) -> Result<PathBuf, OutputError> {
        self.write_at(&result.label, &result.transcript, &self.now())
            .await
    }

    /// Append `transcript` to the log file for `label` at time `at`.
    ///
    /// The file is created if absent; existing content is kept.
    pub async fn write_at(
        &self,
        label: &str,
        transcript: &str,
        at: &DateTime<FixedOffset>,
    ) -> Result<PathBuf, OutputError> {
        let path = self.dir.join(Self::file_name(label, at));
        let wrap = |source| OutputError {
            path: path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(wrap)?;
        file.write_all(transcript.as_bytes()).await.map_err(wrap)?;
        file.flush().await.map_err(wrap)?;

        debug!("wrote {}", path.display());
        Ok(path)
    }
}

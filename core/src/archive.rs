//! File-backed configuration archive.
//!
//! Backups land in `{output_dir}/{YYYY-MM-DD}_{hostname}`. A second backup of the
//! same device on the same day overwrites the first.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use fleetcheck_common::debug;
use fleetcheck_common::error::SinkError;
use fleetcheck_common::ports::ConfigSink;

pub struct FileArchive {
    dir: PathBuf,
}

impl FileArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, hostname: &str, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}_{}", date.format("%Y-%m-%d"), hostname))
    }
}

#[async_trait]
impl ConfigSink for FileArchive {
    async fn save(&self, hostname: &str, date: NaiveDate, content: &str) -> Result<(), SinkError> {
        if !is_file_name_safe(hostname) {
            return Err(SinkError::InvalidHostname(hostname.to_string()));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SinkError::Write {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(hostname, date);
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| SinkError::Write {
                path: path.clone(),
                source,
            })?;

        debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}

fn is_file_name_safe(hostname: &str) -> bool {
    !hostname.is_empty()
        && hostname != "."
        && hostname != ".."
        && !hostname.contains(['/', '\\', '\0'])
}

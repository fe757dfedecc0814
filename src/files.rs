//! File and reporting collaborator
//!
//! Screenshot persistence and file download live behind a narrow trait so the
//! action layer never decides where artifacts go. [`FsFileStore`] writes them
//! under a configured directory with timestamped names.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};

/// Persistence collaborator for screenshots and downloaded files
#[async_trait]
pub trait FileStore: Send + Sync + Debug {
    /// Persist PNG bytes as a fresh screenshot artifact, returning its path
    async fn create_screenshot_file(&self, png: &[u8]) -> Result<PathBuf>;

    /// Surface a persisted screenshot to whatever reporting sink is attached
    async fn report_screenshot(&self, path: &Path) -> Result<()>;

    /// Fetch `url` into the artifact directory as `{prefix}-....{extension}`
    async fn download_file(&self, url: &str, prefix: &str, extension: &str) -> Result<PathBuf>;
}

/// Filesystem-backed [`FileStore`]
#[derive(Debug, Clone)]
pub struct FsFileStore {
    artifact_dir: PathBuf,
    http: reqwest::Client,
}

impl FsFileStore {
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.artifact_dir)
    }

    /// `{prefix}-{utc timestamp}-{short uuid}.{extension}` under the
    /// artifact directory
    fn artifact_path(&self, prefix: &str, extension: &str) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let tag = &uuid::Uuid::new_v4().simple().to_string()[..8];
        self.artifact_dir
            .join(format!("{}-{}-{}.{}", prefix, stamp, tag, extension))
    }

    async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.artifact_dir).await?;
        Ok(())
    }
}

#[async_trait]
impl FileStore for FsFileStore {
    async fn create_screenshot_file(&self, png: &[u8]) -> Result<PathBuf> {
        self.ensure_dir().await?;
        let path = self.artifact_path("screenshot", "png");
        tokio::fs::write(&path, png).await?;
        debug!(path = %path.display(), bytes = png.len(), "screenshot written");
        Ok(path)
    }

    async fn report_screenshot(&self, path: &Path) -> Result<()> {
        if !tokio::fs::try_exists(path).await? {
            return Err(Error::internal(format!(
                "Screenshot not found: {}",
                path.display()
            )));
        }
        info!(screenshot = %path.display(), "screenshot captured");
        Ok(())
    }

    async fn download_file(&self, url: &str, prefix: &str, extension: &str) -> Result<PathBuf> {
        self.ensure_dir().await?;
        debug!(url, "downloading file");

        let response = self.http.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.bytes().await?;

        let path = self.artifact_path(prefix, extension);
        tokio::fs::write(&path, &body).await?;
        info!(path = %path.display(), bytes = body.len(), "file downloaded");
        Ok(path)
    }
}

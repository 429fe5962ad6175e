//! Local image cache for product and account pictures

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Image URL has no file name: {0}")]
    NoFileName(String),
    #[error("Image download failed: {0}")]
    Download(String),
    #[error("Image cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which cache directory an image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Product,
    Account,
}

impl EntityKind {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Product => "products",
            Self::Account => "accounts",
        }
    }
}

pub struct ImageCache {
    root: PathBuf,
    client: reqwest::Client,
}

impl ImageCache {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MediaError::Download(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            root: root.into(),
            client,
        })
    }

    /// Cache location for `url`, without touching the filesystem.
    pub fn path_for(&self, url: &str, kind: EntityKind) -> Result<PathBuf, MediaError> {
        let name = file_name(url).ok_or_else(|| MediaError::NoFileName(url.to_string()))?;
        Ok(self.root.join(kind.dir_name()).join(name))
    }

    /// Local copy of `url`, downloading it only when not cached yet.
    pub async fn local_path(&self, url: &str, kind: EntityKind) -> Result<PathBuf, MediaError> {
        let path = self.path_for(url, kind)?;
        if tokio::fs::try_exists(&path).await? {
            return Ok(path);
        }

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let bytes = self.download(url).await?;
        write_atomically(&path, &bytes).await?;
        tracing::debug!(url, path = %path.display(), size = bytes.len(), "Image cached");
        Ok(path)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::Download(format!("{url}: {e}")))?;
        if !response.status().is_success() {
            return Err(MediaError::Download(format!("{url}: HTTP {}", response.status())));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::Download(format!("{url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Last path segment of a URL, ignoring query and fragment.
fn file_name(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    path.rsplit('/').next().filter(|name| !name.is_empty() && *name != "..")
}

/// Write through a temp file so a partial download never looks cached.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    let tmp = path.with_extension("part");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}

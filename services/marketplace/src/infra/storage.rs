use std::path::{Path, PathBuf};

use anyhow::Context as _;
use uuid::Uuid;

use crate::domain::repository::FileStore;
use crate::domain::types::upload_extension;
use crate::error::MarketplaceError;

/// Writes uploads below `public_dir` so the static file service can serve
/// them at `url_prefix`.
#[derive(Clone, Debug)]
pub struct LocalFileStore {
    public_dir: PathBuf,
    url_prefix: String,
}

impl LocalFileStore {
    pub fn new(public_dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        let trimmed = url_prefix.trim_matches('/');
        Self {
            public_dir: public_dir.into(),
            url_prefix: format!("/{trimmed}"),
        }
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    /// Normalized prefix: leading slash, no trailing slash.
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    fn upload_dir(&self) -> PathBuf {
        self.public_dir.join(self.url_prefix.trim_start_matches('/'))
    }
}

impl FileStore for LocalFileStore {
    async fn save(
        &self,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, MarketplaceError> {
        let ext = upload_extension(original_name)
            .ok_or_else(|| MarketplaceError::invalid("unsupported file type"))?;
        let dir = self.upload_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create upload dir {}", dir.display()))?;

        let name = format!("{}.{ext}", Uuid::now_v7());
        let path = dir.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "upload stored");
        Ok(format!("{}/{name}", self.url_prefix))
    }
}

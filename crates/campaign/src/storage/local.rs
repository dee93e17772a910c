use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::{ImageStore, StorageError};

/// Writes images to a local directory and returns `file://` URLs
pub struct LocalImageStore {
    output_dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, bytes: &[u8], name: &str) -> Result<String, StorageError> {
        fs::create_dir_all(&self.output_dir).await?;

        let path = self.output_dir.join(name);
        fs::write(&path, bytes).await?;

        let absolute = fs::canonicalize(&path).await?;
        tracing::info!("[STORAGE] Saved {} locally at {}", name, absolute.display());

        Ok(format!("file://{}", absolute.display()))
    }
}

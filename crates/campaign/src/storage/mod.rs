//! Image storage backends
//!
//! Generated images are saved through [`ImageStore`]. The backend is picked
//! from configuration: Cloud Storage, the local filesystem, or Cloud Storage
//! with a local fallback.

mod gcs;
mod local;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::{CampaignConfig, StorageBackend},
    google::auth::TokenProvider,
};

pub use gcs::GcsImageStore;
pub use local::LocalImageStore;

/// Errors from storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed ({status}): {message}")]
    Upload { status: u16, message: String },

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication error: {0}")]
    Auth(String),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `bytes` as `name` and return a URL pointing at it
    async fn save(&self, bytes: &[u8], name: &str) -> Result<String, StorageError>;
}

/// Tries `primary`, then `fallback` when the primary errors
pub struct FallbackImageStore {
    primary: Arc<dyn ImageStore>,
    fallback: Arc<dyn ImageStore>,
}

impl FallbackImageStore {
    pub fn new(primary: Arc<dyn ImageStore>, fallback: Arc<dyn ImageStore>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl ImageStore for FallbackImageStore {
    async fn save(&self, bytes: &[u8], name: &str) -> Result<String, StorageError> {
        match self.primary.save(bytes, name).await {
            Ok(url) => Ok(url),
            Err(e) => {
                tracing::warn!("[STORAGE] Primary store failed for {}: {}; using fallback", name, e);
                self.fallback.save(bytes, name).await
            }
        }
    }
}

/// Build the configured image store; Cloud Storage uploads go through `client`
pub fn image_store_for(
    config: &CampaignConfig,
    client: Client,
    tokens: Arc<dyn TokenProvider>,
) -> Arc<dyn ImageStore> {
    let local = || -> Arc<dyn ImageStore> {
        Arc::new(LocalImageStore::new(config.output_dir.clone()))
    };
    let gcs = || -> Arc<dyn ImageStore> {
        Arc::new(GcsImageStore::new(
            client.clone(),
            config.storage_bucket(),
            tokens.clone(),
        ))
    };

    match config.storage {
        StorageBackend::Local => local(),
        StorageBackend::Gcs => gcs(),
        StorageBackend::GcsWithLocalFallback => Arc::new(FallbackImageStore::new(gcs(), local())),
    }
}

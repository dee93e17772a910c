//! Runtime configuration for the campaign pipeline
//!
//! Read once at startup from the process environment (after loading `.env`)
//! and passed by reference to every component that needs it.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

pub const DEFAULT_REQUEST: &str = "AI tools and automation";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_IMAGEN_MODEL: &str = "imagegeneration@006";
pub const DEFAULT_MAX_KEYWORDS: usize = 10;

/// Errors raised while building the configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not found in environment")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Where generated images are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    /// Google Cloud Storage only
    Gcs,
    /// Local filesystem only
    Local,
    /// Cloud Storage, falling back to the local filesystem on upload failure
    GcsWithLocalFallback,
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::GcsWithLocalFallback
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Gcs => write!(f, "gcs"),
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::GcsWithLocalFallback => write!(f, "gcs-with-local-fallback"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gcs" | "cloud" => Ok(StorageBackend::Gcs),
            "local" | "fs" => Ok(StorageBackend::Local),
            "gcs-with-local-fallback" | "fallback" => Ok(StorageBackend::GcsWithLocalFallback),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

/// Immutable configuration for one campaign run
#[derive(Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub project_id: String,
    pub location: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Service account key used for BigQuery, Vertex AI and Cloud Storage
    pub service_account_path: PathBuf,
    /// OAuth client secrets for the installed-app flow (Docs, Slides)
    pub client_secrets_path: PathBuf,
    /// Where the installed-app flow persists its tokens
    pub token_cache_path: PathBuf,
    pub storage: StorageBackend,
    pub output_dir: PathBuf,
    pub gemini_model: String,
    pub imagen_model: String,
    /// Route the editor stage through Gemini instead of the local polish only
    pub editor_uses_model: bool,
    pub max_keywords: usize,
}

impl CampaignConfig {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Required keys are checked before
    /// anything else is parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let project_id = required("PROJECT_ID")?;
        let location = required("LOCATION")?;
        let api_key = required("GOOGLE_API_KEY")?;
        let service_account_path = PathBuf::from(required("GOOGLE_APPLICATION_CREDENTIALS")?);

        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let storage = match optional("CAMPAIGN_STORAGE") {
            Some(value) => value.parse::<StorageBackend>().map_err(|_| ConfigError::Invalid {
                name: "CAMPAIGN_STORAGE",
                value,
            })?,
            None => StorageBackend::default(),
        };

        let editor_uses_model = match optional("CAMPAIGN_EDITOR_MODEL") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                name: "CAMPAIGN_EDITOR_MODEL",
                value,
            })?,
            None => false,
        };

        let max_keywords = match optional("TREND_MAX_KEYWORDS") {
            Some(value) => {
                let parsed = value.trim().parse::<usize>();
                match parsed {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return Err(ConfigError::Invalid {
                            name: "TREND_MAX_KEYWORDS",
                            value,
                        })
                    }
                }
            }
            None => DEFAULT_MAX_KEYWORDS,
        };

        let config = Self {
            project_id,
            location,
            api_key,
            service_account_path,
            client_secrets_path: optional("GOOGLE_CLIENT_SECRETS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("credentials.json")),
            token_cache_path: optional("GOOGLE_TOKEN_CACHE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("token.json")),
            storage,
            output_dir: optional("CAMPAIGN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("generated_images")),
            gemini_model: optional("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            imagen_model: optional("IMAGEN_MODEL").unwrap_or_else(|| DEFAULT_IMAGEN_MODEL.into()),
            editor_uses_model,
            max_keywords,
        };

        tracing::info!(
            "Config loaded - Project: {}, Location: {}, Storage: {}",
            config.project_id,
            config.location,
            config.storage
        );

        Ok(config)
    }

    /// Bucket holding generated marketing images
    pub fn storage_bucket(&self) -> String {
        format!("{}-generated-images", self.project_id)
    }
}

impl fmt::Debug for CampaignConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CampaignConfig")
            .field("project_id", &self.project_id)
            .field("location", &self.location)
            .field("api_key", &"<redacted>")
            .field("service_account_path", &self.service_account_path)
            .field("client_secrets_path", &self.client_secrets_path)
            .field("token_cache_path", &self.token_cache_path)
            .field("storage", &self.storage)
            .field("output_dir", &self.output_dir)
            .field("gemini_model", &self.gemini_model)
            .field("imagen_model", &self.imagen_model)
            .field("editor_uses_model", &self.editor_uses_model)
            .field("max_keywords", &self.max_keywords)
            .finish()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

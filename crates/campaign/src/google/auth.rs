//! Google OAuth token providers
//!
//! Two flows are used:
//! - a service account (BigQuery, Vertex AI, Cloud Storage)
//! - the installed-app flow for the user's Docs and Slides, with tokens
//!   persisted to disk so only the first run is interactive

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use yup_oauth2::{
    authenticator::DefaultAuthenticator, InstalledFlowAuthenticator, InstalledFlowReturnMethod,
    ServiceAccountAuthenticator,
};

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

pub const WORKSPACE_SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/presentations",
];

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Failed to read credentials at {path}: {message}")]
    Credentials { path: PathBuf, message: String },

    #[error("Token request failed: {0}")]
    Token(String),

    #[error("Token response carried no access token")]
    EmptyToken,
}

/// Source of OAuth bearer tokens
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self, scopes: &[&str]) -> Result<String, AuthError>;
}

async fn bearer(auth: &DefaultAuthenticator, scopes: &[&str]) -> Result<String, AuthError> {
    let token = auth
        .token(scopes)
        .await
        .map_err(|e| AuthError::Token(e.to_string()))?;
    token
        .token()
        .map(str::to_string)
        .ok_or(AuthError::EmptyToken)
}

/// Service-account credentials, loaded on first use
pub struct ServiceAccountTokens {
    key_path: PathBuf,
    auth: OnceCell<DefaultAuthenticator>,
}

impl ServiceAccountTokens {
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            auth: OnceCell::new(),
        }
    }

    async fn authenticator(&self) -> Result<&DefaultAuthenticator, AuthError> {
        self.auth
            .get_or_try_init(|| async {
                let credentials_error = |e: std::io::Error| AuthError::Credentials {
                    path: self.key_path.clone(),
                    message: e.to_string(),
                };
                let key = yup_oauth2::read_service_account_key(&self.key_path)
                    .await
                    .map_err(credentials_error)?;
                ServiceAccountAuthenticator::builder(key)
                    .build()
                    .await
                    .map_err(credentials_error)
            })
            .await
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokens {
    async fn access_token(&self, scopes: &[&str]) -> Result<String, AuthError> {
        let auth = self.authenticator().await?;
        bearer(auth, scopes).await
    }
}

/// Installed-app (desktop) flow for the user's Workspace account
pub struct InstalledAppTokens {
    client_secrets_path: PathBuf,
    token_cache_path: PathBuf,
    auth: OnceCell<DefaultAuthenticator>,
}

impl InstalledAppTokens {
    pub fn new(
        client_secrets_path: impl Into<PathBuf>,
        token_cache_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client_secrets_path: client_secrets_path.into(),
            token_cache_path: token_cache_path.into(),
            auth: OnceCell::new(),
        }
    }

    pub fn token_cache_path(&self) -> &PathBuf {
        &self.token_cache_path
    }

    /// Whether a previous authorization left a token file behind
    pub fn has_cached_token(&self) -> bool {
        self.token_cache_path.exists()
    }

    async fn authenticator(&self) -> Result<&DefaultAuthenticator, AuthError> {
        self.auth
            .get_or_try_init(|| async {
                let secret = yup_oauth2::read_application_secret(&self.client_secrets_path)
                    .await
                    .map_err(|e| AuthError::Credentials {
                        path: self.client_secrets_path.clone(),
                        message: e.to_string(),
                    })?;

                if !self.has_cached_token() {
                    tracing::info!(
                        "No cached token at {}, starting interactive authorization",
                        self.token_cache_path.display()
                    );
                }

                InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
                    .persist_tokens_to_disk(self.token_cache_path.clone())
                    .build()
                    .await
                    .map_err(|e| AuthError::Credentials {
                        path: self.token_cache_path.clone(),
                        message: e.to_string(),
                    })
            })
            .await
    }
}

#[async_trait]
impl TokenProvider for InstalledAppTokens {
    async fn access_token(&self, scopes: &[&str]) -> Result<String, AuthError> {
        let auth = self.authenticator().await?;
        bearer(auth, scopes).await
    }
}

//! Google Cloud and Workspace collaborators
//!
//! Thin REST clients over reqwest. Each one implements the seam trait of the
//! stage or store that uses it, so the pipeline never sees HTTP directly.

pub mod auth;
pub mod bigquery;
pub mod gemini;
pub mod imagen;

pub use auth::{AuthError, InstalledAppTokens, ServiceAccountTokens, TokenProvider};
pub use bigquery::BigQueryTrendSource;
pub use gemini::GeminiClient;
pub use imagen::ImagenClient;

//! Campaign stages
//!
//! Five sequential stages, each a typed transformation from one payload to
//! the next:
//! 1. Trend - trending keywords for the request
//! 2. Copy - blog, email and social copy from the keywords
//! 3. Design - infographic and social banner images
//! 4. Edit - polished copy
//! 5. SEO - search-optimized copy

pub mod copy;
pub mod design;
pub mod editor;
pub mod seo;
pub mod trend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::payload::{PayloadKey, StagePayload};

pub use copy::CopyStage;
pub use design::{DesignStage, ImageGenerator};
pub use editor::{EditorStage, LanguageModel};
pub use seo::SeoStage;
pub use trend::{TrendSource, TrendStage};

/// Stage names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Trend,
    Copy,
    Design,
    Edit,
    Seo,
}

impl Stage {
    pub const ALL: [Stage; 5] = [Stage::Trend, Stage::Copy, Stage::Design, Stage::Edit, Stage::Seo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Trend => "trend",
            Stage::Copy => "copy",
            Stage::Design => "design",
            Stage::Edit => "edit",
            Stage::Seo => "seo",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Trend => "Trend Analysis",
            Stage::Copy => "Copywriting",
            Stage::Design => "Visual Design",
            Stage::Edit => "Editing",
            Stage::Seo => "SEO Optimization",
        }
    }

    pub fn order(&self) -> u32 {
        match self {
            Stage::Trend => 1,
            Stage::Copy => 2,
            Stage::Design => 3,
            Stage::Edit => 4,
            Stage::Seo => 5,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a stage or the collaborator it delegates to
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("{stage} collaborator failed: {message}")]
    Collaborator { stage: Stage, message: String },

    #[error("{stage} expected {expected} but received {actual}")]
    InputMismatch {
        stage: Stage,
        expected: PayloadKey,
        actual: PayloadKey,
    },

    #[error("{stage} input {key} has not been produced")]
    MissingInput { stage: Stage, key: PayloadKey },

    #[error("{stage} output {key} was never produced")]
    MissingOutput { stage: Stage, key: PayloadKey },

    #[error("{stage} returned {actual}, declared {declared}")]
    OutputMismatch {
        stage: Stage,
        declared: PayloadKey,
        actual: PayloadKey,
    },

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication error: {0}")]
    Auth(String),
}

impl StageError {
    pub fn collaborator(stage: Stage, message: impl Into<String>) -> Self {
        StageError::Collaborator {
            stage,
            message: message.into(),
        }
    }
}

/// A typed stage function
///
/// Implementors declare their input and output payload types; the agent
/// wrapper handles extraction from and wrapping into [`StagePayload`].
#[async_trait]
pub trait StageFn: Send + Sync {
    type Input: for<'a> TryFrom<&'a StagePayload, Error = PayloadKey> + Send;
    type Output: Into<StagePayload> + Send;

    fn stage(&self) -> Stage;

    async fn call(&self, input: Self::Input) -> Result<Self::Output, StageError>;
}

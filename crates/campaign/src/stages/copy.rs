//! Stage 2: Copywriting

use async_trait::async_trait;

use crate::payload::{TrendData, WrittenContent};

use super::{Stage, StageError, StageFn};

/// Turns trending keywords into blog, email and social copy
#[derive(Debug, Default, Clone)]
pub struct CopyStage;

impl CopyStage {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(trends: &TrendData) -> WrittenContent {
        let keywords = trends.trending_keywords.join(", ");
        WrittenContent {
            blog: format!("Explore the future of {} in our latest blog!", keywords),
            email: format!("Subject: Stay ahead with {}", keywords),
            social: format!("🚀 Trending Now: {}. Join the movement!", keywords),
        }
    }
}

#[async_trait]
impl StageFn for CopyStage {
    type Input = TrendData;
    type Output = WrittenContent;

    fn stage(&self) -> Stage {
        Stage::Copy
    }

    async fn call(&self, trends: TrendData) -> Result<WrittenContent, StageError> {
        tracing::debug!(
            "[COPYWRITER] Writing copy for {} keywords",
            trends.trending_keywords.len()
        );
        Ok(Self::generate(&trends))
    }
}

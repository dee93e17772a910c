//! Stage 5: SEO Optimization

use async_trait::async_trait;

use crate::payload::{EditedContent, SeoContent};

use super::{Stage, StageError, StageFn};

pub const SEO_MARKER: &str = "[SEO Optimized]";

#[derive(Debug, Default, Clone)]
pub struct SeoStage;

impl SeoStage {
    pub fn new() -> Self {
        Self
    }

    pub fn optimize(content: &EditedContent) -> SeoContent {
        SeoContent {
            blog: format!("{} {}", SEO_MARKER, content.blog),
            email: content.email.clone(),
            social: content.social.clone(),
        }
    }
}

#[async_trait]
impl StageFn for SeoStage {
    type Input = EditedContent;
    type Output = SeoContent;

    fn stage(&self) -> Stage {
        Stage::Seo
    }

    async fn call(&self, content: EditedContent) -> Result<SeoContent, StageError> {
        Ok(Self::optimize(&content))
    }
}

//! Stage 3: Visual Design
//!
//! Generates an infographic and a social banner from the written copy and
//! stores both images. Image generation is best-effort: any failure yields
//! placeholder assets marked `failed` rather than failing the pipeline.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    payload::{DesignPrompts, GenerationStatus, VisualAssets, WrittenContent},
    storage::ImageStore,
};

use super::{Stage, StageError, StageFn};

pub const PLACEHOLDER_INFOGRAPHIC: &str =
    "https://via.placeholder.com/600x800/0066CC/FFFFFF?text=Infographic";
pub const PLACEHOLDER_BANNER: &str =
    "https://via.placeholder.com/1200x675/FF6B6B/FFFFFF?text=Social+Banner";

const INFOGRAPHIC_FILE: &str = "infographic.png";
const BANNER_FILE: &str = "social_banner.png";

/// A single image generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: &'static str,
}

/// Text-to-image backend
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns PNG bytes
    async fn generate_image(&self, request: &ImageRequest) -> Result<Vec<u8>, StageError>;
}

pub struct DesignStage {
    generator: Arc<dyn ImageGenerator>,
    store: Arc<dyn ImageStore>,
}

impl DesignStage {
    pub fn new(generator: Arc<dyn ImageGenerator>, store: Arc<dyn ImageStore>) -> Self {
        Self { generator, store }
    }

    fn build_prompts(content: &WrittenContent) -> DesignPrompts {
        let infographic = format!(
            "Create a professional infographic design about: {}\n\
             Style: Clean, modern, corporate\n\
             Include: Charts, icons, text overlays\n\
             Color scheme: Blue and white\n\
             Layout: Vertical orientation",
            content.blog
        );
        let banner = format!(
            "Create a social media banner for: {}\n\
             Style: Eye-catching, vibrant, engaging\n\
             Include: Bold text, trendy graphics\n\
             Color scheme: Gradient background\n\
             Layout: 16:9 aspect ratio",
            content.social
        );
        DesignPrompts {
            infographic,
            banner,
        }
    }

    async fn render(&self, prompts: &DesignPrompts) -> Result<(String, String), StageError> {
        tracing::info!("[DESIGNER] Generating infographic...");
        let infographic = self
            .generator
            .generate_image(&ImageRequest {
                prompt: prompts.infographic.clone(),
                aspect_ratio: "9:16",
            })
            .await?;

        tracing::info!("[DESIGNER] Generating social banner...");
        let banner = self
            .generator
            .generate_image(&ImageRequest {
                prompt: prompts.banner.clone(),
                aspect_ratio: "16:9",
            })
            .await?;

        let infographic_url = self
            .store
            .save(&infographic, INFOGRAPHIC_FILE)
            .await
            .map_err(|e| StageError::collaborator(Stage::Design, e.to_string()))?;
        let banner_url = self
            .store
            .save(&banner, BANNER_FILE)
            .await
            .map_err(|e| StageError::collaborator(Stage::Design, e.to_string()))?;

        Ok((infographic_url, banner_url))
    }
}

#[async_trait]
impl StageFn for DesignStage {
    type Input = WrittenContent;
    type Output = VisualAssets;

    fn stage(&self) -> Stage {
        Stage::Design
    }

    async fn call(&self, content: WrittenContent) -> Result<VisualAssets, StageError> {
        let prompts = Self::build_prompts(&content);

        match self.render(&prompts).await {
            Ok((infographic_url, social_banner_url)) => Ok(VisualAssets {
                infographic_url,
                social_banner_url,
                generation_status: GenerationStatus::Success,
                prompts: Some(prompts),
                error: None,
            }),
            Err(e) => {
                tracing::error!("[DESIGNER] Error generating images: {}", e);
                Ok(VisualAssets {
                    infographic_url: PLACEHOLDER_INFOGRAPHIC.to_string(),
                    social_banner_url: PLACEHOLDER_BANNER.to_string(),
                    generation_status: GenerationStatus::Failed,
                    prompts: None,
                    error: Some(e.to_string()),
                })
            }
        }
    }
}

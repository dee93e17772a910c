//! Agent wrappers
//!
//! An agent binds one typed stage function to its metadata (name,
//! instruction, declared input and output keys) and exposes a uniform,
//! object-safe call contract over [`StagePayload`].

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    payload::{PayloadKey, StagePayload},
    stages::{Stage, StageError, StageFn},
};

/// Static description of an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub instruction: &'static str,
    pub stage: Stage,
    pub input_key: PayloadKey,
    pub output_key: PayloadKey,
}

impl AgentDescriptor {
    pub fn trend() -> Self {
        Self {
            name: "TrendAgent",
            description: "Provides real-time trend insights using BigQuery.",
            instruction: "You analyze marketing trends using tools like BigQuery. \
                          Return current trending topics, customer behavior, or market shifts.",
            stage: Stage::Trend,
            input_key: PayloadKey::CampaignRequest,
            output_key: PayloadKey::TrendData,
        }
    }

    pub fn copywriter() -> Self {
        Self {
            name: "CopywriterAgent",
            description: "Generates marketing content from trend insights.",
            instruction: "You are a creative copywriter. Use the trend data to write compelling \
                          blog posts, email headlines, and social media content.",
            stage: Stage::Copy,
            input_key: PayloadKey::TrendData,
            output_key: PayloadKey::WrittenContent,
        }
    }

    pub fn designer() -> Self {
        Self {
            name: "DesignerAgent",
            description: "Generates visual assets using Vertex AI.",
            instruction: "You are a graphic designer. Use content to design infographics or \
                          social media visuals using Vertex AI's image capabilities.",
            stage: Stage::Design,
            input_key: PayloadKey::WrittenContent,
            output_key: PayloadKey::VisualAssets,
        }
    }

    pub fn editor() -> Self {
        Self {
            name: "EditorAgent",
            description: "Edits and refines generated content.",
            instruction: "You review and polish content for tone, grammar, and brand voice \
                          consistency.",
            stage: Stage::Edit,
            input_key: PayloadKey::WrittenContent,
            output_key: PayloadKey::EditedContent,
        }
    }

    pub fn seo() -> Self {
        Self {
            name: "SEOAgent",
            description: "Boosts content visibility using SEO techniques.",
            instruction: "You optimize content for SEO. Add keywords and structure blog content \
                          for ranking.",
            stage: Stage::Seo,
            input_key: PayloadKey::EditedContent,
            output_key: PayloadKey::SeoOptimizedContent,
        }
    }
}

/// Uniform call contract the pipeline runs against
#[async_trait]
pub trait CampaignAgent: Send + Sync {
    fn descriptor(&self) -> &AgentDescriptor;

    async fn run(&self, input: &StagePayload) -> Result<StagePayload, StageError>;
}

/// Wraps exactly one stage function
pub struct Agent<F> {
    descriptor: AgentDescriptor,
    stage_fn: F,
}

impl<F: StageFn> Agent<F> {
    pub fn new(descriptor: AgentDescriptor, stage_fn: F) -> Self {
        Self {
            descriptor,
            stage_fn,
        }
    }
}

#[async_trait]
impl<F: StageFn> CampaignAgent for Agent<F> {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn run(&self, input: &StagePayload) -> Result<StagePayload, StageError> {
        let stage = self.stage_fn.stage();
        let typed = <F::Input as TryFrom<&StagePayload>>::try_from(input).map_err(|actual| {
            StageError::InputMismatch {
                stage,
                expected: self.descriptor.input_key,
                actual,
            }
        })?;

        let output: StagePayload = self.stage_fn.call(typed).await?.into();

        if output.key() != self.descriptor.output_key {
            return Err(StageError::OutputMismatch {
                stage,
                declared: self.descriptor.output_key,
                actual: output.key(),
            });
        }

        Ok(output)
    }
}

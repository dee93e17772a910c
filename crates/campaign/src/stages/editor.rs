//! Stage 4: Editing
//!
//! Polishes copy for tone and grammar. A local pass always runs; when a
//! language model is attached each field is additionally rewritten by it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::payload::{EditedContent, WrittenContent};

use super::{Stage, StageError, StageFn};

pub const EDITOR_INSTRUCTION: &str =
    "You review and polish content for tone, grammar, and brand voice consistency. \
     Reply with the revised text only.";

/// Hosted text model used for rewriting
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, instruction: &str, prompt: &str) -> Result<String, StageError>;
}

#[derive(Default)]
pub struct EditorStage {
    model: Option<Arc<dyn LanguageModel>>,
}

impl EditorStage {
    pub fn new() -> Self {
        Self { model: None }
    }

    pub fn with_model(model: Arc<dyn LanguageModel>) -> Self {
        Self { model: Some(model) }
    }

    async fn revise(&self, text: String) -> Result<String, StageError> {
        let Some(model) = &self.model else {
            return Ok(text);
        };
        if text.is_empty() {
            return Ok(text);
        }

        let revised = model.complete(EDITOR_INSTRUCTION, &text).await?;
        let revised = polish(&revised);
        if revised.is_empty() {
            tracing::warn!("[EDITOR] Model returned empty revision, keeping local polish");
            Ok(text)
        } else {
            Ok(revised)
        }
    }
}

#[async_trait]
impl StageFn for EditorStage {
    type Input = WrittenContent;
    type Output = EditedContent;

    fn stage(&self) -> Stage {
        Stage::Edit
    }

    async fn call(&self, content: WrittenContent) -> Result<EditedContent, StageError> {
        let blog = self.revise(finish_sentence(polish(&content.blog))).await?;
        let email = self.revise(polish(&content.email)).await?;
        let social = self.revise(polish(&content.social)).await?;

        Ok(EditedContent { blog, email, social })
    }
}

/// Collapse runs of whitespace, trim, and capitalize a leading lowercase letter
pub fn polish(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => collapsed,
    }
}

fn finish_sentence(mut text: String) -> String {
    if !text.is_empty() && !text.ends_with(['.', '!', '?']) {
        text.push('.');
    }
    text
}

//! Stage 1: Trend Analysis
//!
//! Looks up trending topics related to the campaign request. An empty result
//! is a valid outcome; downstream stages cope with no keywords.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;

use crate::payload::{CampaignRequest, TrendData};

use super::{Stage, StageError, StageFn};

/// Backend that knows what is currently trending
#[async_trait]
pub trait TrendSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_trends(&self, request: &CampaignRequest) -> Result<Vec<String>, StageError>;
}

pub struct TrendStage {
    source: Arc<dyn TrendSource>,
    max_keywords: usize,
}

impl TrendStage {
    pub fn new(source: Arc<dyn TrendSource>, max_keywords: usize) -> Self {
        Self {
            source,
            max_keywords,
        }
    }
}

#[async_trait]
impl StageFn for TrendStage {
    type Input = CampaignRequest;
    type Output = TrendData;

    fn stage(&self) -> Stage {
        Stage::Trend
    }

    async fn call(&self, request: CampaignRequest) -> Result<TrendData, StageError> {
        tracing::info!("[TREND_AGENT] Fetching trends for: {}", request);

        let raw = self.source.fetch_trends(&request).await?;
        let trending_keywords = normalize_keywords(raw, self.max_keywords);

        if trending_keywords.is_empty() {
            tracing::warn!("[TREND_AGENT] No trending keywords found for: {}", request);
        } else {
            tracing::info!(
                "[TREND_AGENT] Found {} keywords from {}",
                trending_keywords.len(),
                self.source.name()
            );
        }

        Ok(TrendData {
            trending_keywords,
            source: self.source.name().to_string(),
        })
    }
}

/// Trim, drop blanks, de-duplicate case-insensitively (first spelling wins)
/// and cap the list.
fn normalize_keywords(raw: Vec<String>, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .take(max)
        .collect()
}

//! Campaign data model
//!
//! Every stage consumes one typed payload and produces another. Payloads are
//! carried between stages inside the [`StagePayload`] tagged union and keyed by
//! [`PayloadKey`]. All payload fields default when absent so a stage never
//! fails on a missing key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stages::Stage;

/// Free-text topic a campaign is built around
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignRequest(String);

impl CampaignRequest {
    /// Returns `None` for a blank request
    pub fn new(query: impl Into<String>) -> Option<Self> {
        let query = query.into().trim().to_string();
        if query.is_empty() {
            None
        } else {
            Some(Self(query))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CampaignRequest {
    fn default() -> Self {
        Self(crate::config::DEFAULT_REQUEST.to_string())
    }
}

impl fmt::Display for CampaignRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of the trend agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendData {
    #[serde(default)]
    pub trending_keywords: Vec<String>,
    #[serde(default)]
    pub source: String,
}

/// Output of the copywriter agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenContent {
    #[serde(default)]
    pub blog: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub social: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Success,
    #[default]
    Failed,
}

/// Prompts sent to the image model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignPrompts {
    #[serde(default)]
    pub infographic: String,
    #[serde(default)]
    pub banner: String,
}

/// Output of the designer agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualAssets {
    #[serde(default)]
    pub infographic_url: String,
    #[serde(default)]
    pub social_banner_url: String,
    #[serde(default)]
    pub generation_status: GenerationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<DesignPrompts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Output of the editor agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditedContent {
    #[serde(default)]
    pub blog: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub social: String,
}

/// Output of the SEO agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoContent {
    #[serde(default)]
    pub blog: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub social: String,
}

/// Name under which a payload is stored while the pipeline runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKey {
    CampaignRequest,
    TrendData,
    WrittenContent,
    VisualAssets,
    EditedContent,
    SeoOptimizedContent,
}

impl PayloadKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKey::CampaignRequest => "campaign_request",
            PayloadKey::TrendData => "trend_data",
            PayloadKey::WrittenContent => "written_content",
            PayloadKey::VisualAssets => "visual_assets",
            PayloadKey::EditedContent => "edited_content",
            PayloadKey::SeoOptimizedContent => "seo_optimized_content",
        }
    }
}

impl fmt::Display for PayloadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged union over every payload shape that flows through the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum StagePayload {
    Request(CampaignRequest),
    Trends(TrendData),
    Copy(WrittenContent),
    Visuals(VisualAssets),
    Edited(EditedContent),
    Seo(SeoContent),
}

impl StagePayload {
    pub fn key(&self) -> PayloadKey {
        match self {
            StagePayload::Request(_) => PayloadKey::CampaignRequest,
            StagePayload::Trends(_) => PayloadKey::TrendData,
            StagePayload::Copy(_) => PayloadKey::WrittenContent,
            StagePayload::Visuals(_) => PayloadKey::VisualAssets,
            StagePayload::Edited(_) => PayloadKey::EditedContent,
            StagePayload::Seo(_) => PayloadKey::SeoOptimizedContent,
        }
    }

    /// Pretty JSON of the inner payload, used for display and documents
    pub fn to_pretty_json(&self) -> String {
        let value = match self {
            StagePayload::Request(r) => serde_json::to_value(r),
            StagePayload::Trends(t) => serde_json::to_value(t),
            StagePayload::Copy(c) => serde_json::to_value(c),
            StagePayload::Visuals(v) => serde_json::to_value(v),
            StagePayload::Edited(e) => serde_json::to_value(e),
            StagePayload::Seo(s) => serde_json::to_value(s),
        };
        value
            .and_then(|v| serde_json::to_string_pretty(&v))
            .unwrap_or_default()
    }
}

macro_rules! payload_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for StagePayload {
                fn from(value: $ty) -> Self {
                    StagePayload::$variant(value)
                }
            }

            impl TryFrom<&StagePayload> for $ty {
                type Error = PayloadKey;

                /// On mismatch, returns the key of the payload actually supplied
                fn try_from(payload: &StagePayload) -> Result<Self, Self::Error> {
                    match payload {
                        StagePayload::$variant(inner) => Ok(inner.clone()),
                        other => Err(other.key()),
                    }
                }
            }
        )*
    };
}

payload_conversions! {
    CampaignRequest => Request,
    TrendData => Trends,
    WrittenContent => Copy,
    VisualAssets => Visuals,
    EditedContent => Edited,
    SeoContent => Seo,
}

/// Terminal state of a campaign record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CampaignStatus {
    Completed,
    Failed { stage: Stage, message: String },
}

/// Timing of one completed stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: Stage,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub elapsed_ms: u64,
}

/// Accumulated result of one pipeline run
///
/// A record is either `Completed` with all five payloads present, or
/// `Failed` with payloads only for the stages that finished before the
/// failure. Records are produced by the pipeline and are read-only after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRecord {
    request: CampaignRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    trends: Option<TrendData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    copy: Option<WrittenContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visuals: Option<VisualAssets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edited: Option<EditedContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seo: Option<SeoContent>,
    campaign_summary: String,
    stages: Vec<StageOutcome>,
    #[serde(flatten)]
    status: CampaignStatus,
}

impl CampaignRecord {
    pub fn request(&self) -> &CampaignRequest {
        &self.request
    }

    pub fn trends(&self) -> Option<&TrendData> {
        self.trends.as_ref()
    }

    pub fn copy(&self) -> Option<&WrittenContent> {
        self.copy.as_ref()
    }

    pub fn visuals(&self) -> Option<&VisualAssets> {
        self.visuals.as_ref()
    }

    pub fn edited(&self) -> Option<&EditedContent> {
        self.edited.as_ref()
    }

    pub fn seo(&self) -> Option<&SeoContent> {
        self.seo.as_ref()
    }

    pub fn summary(&self) -> &str {
        &self.campaign_summary
    }

    pub fn stages(&self) -> &[StageOutcome] {
        &self.stages
    }

    pub fn status(&self) -> &CampaignStatus {
        &self.status
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, CampaignStatus::Completed)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            CampaignStatus::Completed => None,
            CampaignStatus::Failed { message, .. } => Some(message),
        }
    }

    /// Payloads present in the record, in pipeline order
    pub fn payloads(&self) -> Vec<StagePayload> {
        let mut out = Vec::new();
        if let Some(t) = &self.trends {
            out.push(StagePayload::Trends(t.clone()));
        }
        if let Some(c) = &self.copy {
            out.push(StagePayload::Copy(c.clone()));
        }
        if let Some(v) = &self.visuals {
            out.push(StagePayload::Visuals(v.clone()));
        }
        if let Some(e) = &self.edited {
            out.push(StagePayload::Edited(e.clone()));
        }
        if let Some(s) = &self.seo {
            out.push(StagePayload::Seo(s.clone()));
        }
        out
    }
}

/// Mutable accumulator owned by the pipeline while a run is in flight
#[derive(Debug)]
pub(crate) struct RecordBuilder {
    request: CampaignRequest,
    trends: Option<TrendData>,
    copy: Option<WrittenContent>,
    visuals: Option<VisualAssets>,
    edited: Option<EditedContent>,
    seo: Option<SeoContent>,
    stages: Vec<StageOutcome>,
}

impl RecordBuilder {
    pub(crate) fn new(request: CampaignRequest) -> Self {
        Self {
            request,
            trends: None,
            copy: None,
            visuals: None,
            edited: None,
            seo: None,
            stages: Vec::new(),
        }
    }

    /// Look up a payload by key
    pub(crate) fn get(&self, key: PayloadKey) -> Option<StagePayload> {
        match key {
            PayloadKey::CampaignRequest => Some(StagePayload::Request(self.request.clone())),
            PayloadKey::TrendData => self.trends.clone().map(StagePayload::Trends),
            PayloadKey::WrittenContent => self.copy.clone().map(StagePayload::Copy),
            PayloadKey::VisualAssets => self.visuals.clone().map(StagePayload::Visuals),
            PayloadKey::EditedContent => self.edited.clone().map(StagePayload::Edited),
            PayloadKey::SeoOptimizedContent => self.seo.clone().map(StagePayload::Seo),
        }
    }

    /// Store a payload under its own key
    pub(crate) fn insert(&mut self, payload: StagePayload) {
        match payload {
            StagePayload::Request(r) => self.request = r,
            StagePayload::Trends(t) => self.trends = Some(t),
            StagePayload::Copy(c) => self.copy = Some(c),
            StagePayload::Visuals(v) => self.visuals = Some(v),
            StagePayload::Edited(e) => self.edited = Some(e),
            StagePayload::Seo(s) => self.seo = Some(s),
        }
    }

    pub(crate) fn record_stage(&mut self, outcome: StageOutcome) {
        self.stages.push(outcome);
    }

    /// First stage, in pipeline order, whose output is absent
    pub(crate) fn first_missing(&self) -> Option<(Stage, PayloadKey)> {
        let produced = [
            (Stage::Trend, PayloadKey::TrendData, self.trends.is_some()),
            (Stage::Copy, PayloadKey::WrittenContent, self.copy.is_some()),
            (Stage::Design, PayloadKey::VisualAssets, self.visuals.is_some()),
            (Stage::Edit, PayloadKey::EditedContent, self.edited.is_some()),
            (Stage::Seo, PayloadKey::SeoOptimizedContent, self.seo.is_some()),
        ];
        produced
            .into_iter()
            .find(|(_, _, present)| !present)
            .map(|(stage, key, _)| (stage, key))
    }

    pub(crate) fn finish(self) -> CampaignRecord {
        let summary = format!("Complete marketing campaign for: {}", self.request);
        self.build(summary, CampaignStatus::Completed)
    }

    pub(crate) fn fail(self, stage: Stage, message: String) -> CampaignRecord {
        let summary = format!("Failed to create campaign for: {}", self.request);
        self.build(summary, CampaignStatus::Failed { stage, message })
    }

    fn build(self, campaign_summary: String, status: CampaignStatus) -> CampaignRecord {
        CampaignRecord {
            request: self.request,
            trends: self.trends,
            copy: self.copy,
            visuals: self.visuals,
            edited: self.edited,
            seo: self.seo,
            campaign_summary,
            stages: self.stages,
            status,
        }
    }
}

//! # Campaign
//!
//! Marketing campaign orchestration: five sequential agents (trend analysis,
//! copywriting, design, editing, SEO) produce a [`CampaignRecord`], which the
//! [`WorkspacePublisher`] turns into a Google Doc and a Slides deck.

pub mod agent;
pub mod config;
pub mod google;
pub mod payload;
pub mod pipeline;
pub mod publisher;
pub mod service;
pub mod stages;
pub mod storage;

pub use agent::{Agent, AgentDescriptor, CampaignAgent};
pub use config::{CampaignConfig, ConfigError, StorageBackend};
pub use payload::{
    CampaignRecord, CampaignRequest, CampaignStatus, EditedContent, GenerationStatus, PayloadKey,
    SeoContent, StagePayload, TrendData, VisualAssets, WrittenContent,
};
pub use pipeline::{CampaignPipeline, PipelineObserver, PipelineState};
pub use publisher::{PublishError, PublishResult, WorkspacePublisher};
pub use service::CampaignService;
pub use stages::{Stage, StageError, StageFn};
pub use storage::{ImageStore, StorageError};

/// Main error type for campaign operations
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CampaignError>;

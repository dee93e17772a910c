//! Campaign Pipeline
//!
//! Runs the agents in order, threading payloads between them by key:
//! before each step the payload stored under the agent's input key is looked
//! up, and afterwards its output is stored under the agent's output key.
//! The first failure ends the run and is recorded on the returned
//! [`CampaignRecord`]; `run` itself never errors.

use std::{sync::Arc, time::Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    agent::{Agent, AgentDescriptor, CampaignAgent},
    payload::{CampaignRecord, CampaignRequest, RecordBuilder, StageOutcome, StagePayload},
    stages::{
        CopyStage, DesignStage, EditorStage, ImageGenerator, LanguageModel, SeoStage, Stage,
        StageError, TrendSource, TrendStage,
    },
    storage::ImageStore,
};

/// Position of a run in the campaign state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Start,
    Trend,
    Copy,
    Design,
    Edit,
    Seo,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl From<Stage> for PipelineState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Trend => PipelineState::Trend,
            Stage::Copy => PipelineState::Copy,
            Stage::Design => PipelineState::Design,
            Stage::Edit => PipelineState::Edit,
            Stage::Seo => PipelineState::Seo,
        }
    }
}

/// Receives progress notifications while a run is in flight
pub trait PipelineObserver: Send + Sync {
    fn stage_started(&self, _agent: &AgentDescriptor) {}

    fn stage_completed(&self, _agent: &AgentDescriptor, _payload: &StagePayload, _elapsed_ms: u64) {
    }

    fn stage_failed(&self, _agent: &AgentDescriptor, _error: &StageError) {}

    fn state_changed(&self, _from: PipelineState, _to: PipelineState) {}
}

pub struct CampaignPipeline {
    agents: Vec<Arc<dyn CampaignAgent>>,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl CampaignPipeline {
    pub fn new(agents: Vec<Arc<dyn CampaignAgent>>) -> Self {
        Self {
            agents,
            observer: None,
        }
    }

    /// The five-stage campaign wiring
    ///
    /// Design and edit both read the copywriter's output; SEO reads the
    /// editor's.
    pub fn standard(
        trend_source: Arc<dyn TrendSource>,
        image_generator: Arc<dyn ImageGenerator>,
        image_store: Arc<dyn ImageStore>,
        editor_model: Option<Arc<dyn LanguageModel>>,
        max_keywords: usize,
    ) -> Self {
        let editor = match editor_model {
            Some(model) => EditorStage::with_model(model),
            None => EditorStage::new(),
        };

        let agents: Vec<Arc<dyn CampaignAgent>> = vec![
            Arc::new(Agent::new(
                AgentDescriptor::trend(),
                TrendStage::new(trend_source, max_keywords),
            )),
            Arc::new(Agent::new(AgentDescriptor::copywriter(), CopyStage::new())),
            Arc::new(Agent::new(
                AgentDescriptor::designer(),
                DesignStage::new(image_generator, image_store),
            )),
            Arc::new(Agent::new(AgentDescriptor::editor(), editor)),
            Arc::new(Agent::new(AgentDescriptor::seo(), SeoStage::new())),
        ];
        Self::new(agents)
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn transition(&self, state: &mut PipelineState, to: PipelineState) {
        tracing::debug!("[PIPELINE] {:?} -> {:?}", state, to);
        if let Some(observer) = &self.observer {
            observer.state_changed(*state, to);
        }
        *state = to;
    }

    pub async fn run(&self, request: &CampaignRequest) -> CampaignRecord {
        let run_start = Instant::now();
        let mut state = PipelineState::Start;
        let mut builder = RecordBuilder::new(request.clone());

        tracing::info!("[PIPELINE] Starting campaign for: {}", request);

        for agent in &self.agents {
            let descriptor = agent.descriptor();
            self.transition(&mut state, descriptor.stage.into());

            let Some(input) = builder.get(descriptor.input_key) else {
                let error = StageError::MissingInput {
                    stage: descriptor.stage,
                    key: descriptor.input_key,
                };
                return self.agent_failed(&mut state, builder, descriptor, error);
            };

            tracing::info!(
                "[PIPELINE] Stage {}/{}: {} ({})",
                descriptor.stage.order(),
                Stage::ALL.len(),
                descriptor.stage.display_name(),
                descriptor.name
            );
            if let Some(observer) = &self.observer {
                observer.stage_started(descriptor);
            }

            let started_at = Utc::now();
            let stage_start = Instant::now();
            match agent.run(&input).await {
                Ok(output) => {
                    let elapsed_ms = stage_start.elapsed().as_millis() as u64;
                    tracing::info!(
                        "[PIPELINE] {} produced {} in {}ms",
                        descriptor.name,
                        output.key(),
                        elapsed_ms
                    );
                    if let Some(observer) = &self.observer {
                        observer.stage_completed(descriptor, &output, elapsed_ms);
                    }
                    builder.insert(output);
                    builder.record_stage(StageOutcome {
                        stage: descriptor.stage,
                        started_at,
                        elapsed_ms,
                    });
                }
                Err(error) => return self.agent_failed(&mut state, builder, descriptor, error),
            }
        }

        // A run only completes when every stage output is present
        if let Some((stage, key)) = builder.first_missing() {
            let error = StageError::MissingOutput { stage, key };
            return self.fail(&mut state, builder, stage, error);
        }

        self.transition(&mut state, PipelineState::Done);
        tracing::info!(
            "[PIPELINE] Campaign completed in {}ms",
            run_start.elapsed().as_millis()
        );
        builder.finish()
    }

    fn agent_failed(
        &self,
        state: &mut PipelineState,
        builder: RecordBuilder,
        descriptor: &AgentDescriptor,
        error: StageError,
    ) -> CampaignRecord {
        tracing::error!("[PIPELINE] {} failed", descriptor.name);
        if let Some(observer) = &self.observer {
            observer.stage_failed(descriptor, &error);
        }
        self.fail(state, builder, descriptor.stage, error)
    }

    fn fail(
        &self,
        state: &mut PipelineState,
        builder: RecordBuilder,
        stage: Stage,
        error: StageError,
    ) -> CampaignRecord {
        tracing::error!("[PIPELINE] {} failed: {}", stage.display_name(), error);
        self.transition(state, PipelineState::Failed);
        builder.fail(stage, error.to_string())
    }
}

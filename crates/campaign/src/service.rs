//! Production wiring
//!
//! Builds the pipeline and publisher from a [`CampaignConfig`] with the
//! Google collaborators behind every seam.

use std::{path::PathBuf, sync::Arc};

use reqwest::Client;

use crate::{
    config::CampaignConfig,
    google::{
        auth::WORKSPACE_SCOPES, BigQueryTrendSource, GeminiClient, ImagenClient,
        InstalledAppTokens, ServiceAccountTokens, TokenProvider,
    },
    payload::{CampaignRecord, CampaignRequest},
    pipeline::{CampaignPipeline, PipelineObserver},
    publisher::{GoogleDocsClient, GoogleSlidesClient, PublishResult, WorkspacePublisher},
    stages::LanguageModel,
    storage::image_store_for,
    CampaignError, Result,
};

pub struct CampaignService {
    pipeline: CampaignPipeline,
    publisher: WorkspacePublisher<GoogleDocsClient, GoogleSlidesClient>,
    workspace_tokens: Arc<InstalledAppTokens>,
}

impl CampaignService {
    pub fn new(config: &CampaignConfig) -> Self {
        let client = Client::new();
        let cloud_tokens: Arc<dyn TokenProvider> =
            Arc::new(ServiceAccountTokens::new(config.service_account_path.clone()));
        let workspace_tokens = Arc::new(InstalledAppTokens::new(
            config.client_secrets_path.clone(),
            config.token_cache_path.clone(),
        ));

        let trend_source = Arc::new(BigQueryTrendSource::new(
            client.clone(),
            cloud_tokens.clone(),
            config.project_id.clone(),
        ));
        let image_generator = Arc::new(ImagenClient::new(
            client.clone(),
            cloud_tokens.clone(),
            config.project_id.clone(),
            config.location.clone(),
            config.imagen_model.clone(),
        ));
        let editor_model = config.editor_uses_model.then(|| {
            Arc::new(GeminiClient::new(
                client.clone(),
                config.api_key.clone(),
                config.gemini_model.clone(),
            )) as Arc<dyn LanguageModel>
        });

        let pipeline = CampaignPipeline::standard(
            trend_source,
            image_generator,
            image_store_for(config, client.clone(), cloud_tokens),
            editor_model,
            config.max_keywords,
        );

        let docs_tokens: Arc<dyn TokenProvider> = workspace_tokens.clone();
        let publisher = WorkspacePublisher::new(
            GoogleDocsClient::new(client.clone(), docs_tokens.clone()),
            GoogleSlidesClient::new(client, docs_tokens),
        );

        tracing::debug!(
            "[SERVICE] Configured for project {} in {} (storage: {})",
            config.project_id,
            config.location,
            config.storage
        );

        Self {
            pipeline,
            publisher,
            workspace_tokens,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.pipeline = self.pipeline.with_observer(observer);
        self
    }

    pub async fn run(&self, request: &CampaignRequest) -> CampaignRecord {
        self.pipeline.run(request).await
    }

    pub async fn publish(&self, record: &CampaignRecord) -> PublishResult {
        self.publisher.publish(record).await
    }

    /// Run the installed-app flow once and return where the token was cached
    pub async fn authorize(&self) -> Result<PathBuf> {
        self.workspace_tokens
            .access_token(&WORKSPACE_SCOPES)
            .await
            .map_err(|e| CampaignError::Auth(e.to_string()))?;
        Ok(self.workspace_tokens.token_cache_path().clone())
    }
}

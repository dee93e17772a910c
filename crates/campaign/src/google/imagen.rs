//! Vertex AI Imagen image generation

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::auth::{TokenProvider, CLOUD_PLATFORM_SCOPE};
use crate::stages::{design::ImageRequest, ImageGenerator, Stage, StageError};

pub struct ImagenClient {
    client: Client,
    tokens: Arc<dyn TokenProvider>,
    project_id: String,
    location: String,
    model: String,
}

impl ImagenClient {
    pub fn new(
        client: Client,
        tokens: Arc<dyn TokenProvider>,
        project_id: impl Into<String>,
        location: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tokens,
            project_id: project_id.into(),
            location: location.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{project}/locations/{loc}/publishers/google/models/{model}:predict",
            loc = self.location,
            project = self.project_id,
            model = self.model,
        )
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: [PredictInstance<'a>; 1],
    parameters: PredictParameters<'a>,
}

#[derive(Debug, Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: u32,
    aspect_ratio: &'a str,
    safety_setting: &'a str,
    person_generation: &'a str,
}

impl<'a> PredictRequest<'a> {
    fn new(request: &'a ImageRequest) -> Self {
        Self {
            instances: [PredictInstance {
                prompt: &request.prompt,
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: request.aspect_ratio,
                safety_setting: "block_some",
                person_generation: "dont_allow",
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
}

/// Decode the first prediction's image bytes
fn decode_first_image(response: PredictResponse) -> Result<Vec<u8>, StageError> {
    let encoded = response
        .predictions
        .into_iter()
        .find_map(|p| p.bytes_base64_encoded)
        .ok_or_else(|| StageError::collaborator(Stage::Design, "Imagen returned no images"))?;

    base64::engine::general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| StageError::collaborator(Stage::Design, format!("Invalid image data: {}", e)))
}

#[async_trait]
impl ImageGenerator for ImagenClient {
    async fn generate_image(&self, request: &ImageRequest) -> Result<Vec<u8>, StageError> {
        let token = self
            .tokens
            .access_token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| StageError::Auth(e.to_string()))?;

        tracing::debug!(
            "[IMAGEN] Predict with {} ({})",
            self.model,
            request.aspect_ratio
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(token)
            .json(&PredictRequest::new(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::collaborator(
                Stage::Design,
                format!("Imagen API error ({}): {}", status, body),
            ));
        }

        let parsed: PredictResponse = response.json().await?;
        decode_first_image(parsed)
    }
}

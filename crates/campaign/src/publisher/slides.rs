use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{id_field, post_json, PublishError, Section, SlideSink};
use crate::google::auth::{TokenProvider, WORKSPACE_SCOPES};

const SLIDES_API_BASE: &str = "https://slides.googleapis.com/v1/presentations";

/// Google Slides v1 client
pub struct GoogleSlidesClient {
    client: Client,
    tokens: Arc<dyn TokenProvider>,
}

impl GoogleSlidesClient {
    pub fn new(client: Client, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { client, tokens }
    }

    pub fn presentation_link(presentation_id: &str) -> String {
        format!(
            "https://docs.google.com/presentation/d/{}/edit",
            presentation_id
        )
    }
}

/// createSlide plus title/body inserts for each section
///
/// Object ids are assigned up front so the inserts can target the new
/// placeholders in the same batch. The Slides API rejects empty inserts, so
/// blank titles and bodies are skipped.
fn slide_requests(sections: &[Section]) -> Value {
    let mut requests = Vec::new();

    for (i, section) in sections.iter().enumerate() {
        let slide_id = format!("campaign_slide_{}", i);
        let title_id = format!("{}_title", slide_id);
        let body_id = format!("{}_body", slide_id);

        requests.push(json!({
            "createSlide": {
                "objectId": slide_id,
                "slideLayoutReference": { "predefinedLayout": "TITLE_AND_BODY" },
                "placeholderIdMappings": [
                    { "layoutPlaceholder": { "type": "TITLE", "index": 0 }, "objectId": title_id },
                    { "layoutPlaceholder": { "type": "BODY", "index": 0 }, "objectId": body_id },
                ],
            }
        }));

        for (object_id, text) in [(&title_id, section.title), (&body_id, section.body.as_str())] {
            if text.is_empty() {
                continue;
            }
            requests.push(json!({
                "insertText": {
                    "objectId": object_id,
                    "insertionIndex": 0,
                    "text": text,
                }
            }));
        }
    }

    json!({ "requests": requests })
}

#[async_trait]
impl SlideSink for GoogleSlidesClient {
    async fn create_presentation(
        &self,
        title: &str,
        slides: &[Section],
    ) -> Result<String, PublishError> {
        let token = self
            .tokens
            .access_token(&WORKSPACE_SCOPES)
            .await
            .map_err(|e| PublishError::Auth(e.to_string()))?;

        let created =
            post_json(&self.client, SLIDES_API_BASE, &token, &json!({ "title": title })).await?;
        let presentation_id = id_field(&created, "presentationId")?;
        tracing::debug!("[PUBLISHER] Created presentation {}", presentation_id);

        let url = format!("{}/{}:batchUpdate", SLIDES_API_BASE, presentation_id);
        post_json(&self.client, &url, &token, &slide_requests(slides)).await?;

        let link = Self::presentation_link(&presentation_id);
        tracing::info!("[PUBLISHER] Google Slides created: {}", link);
        Ok(link)
    }
}

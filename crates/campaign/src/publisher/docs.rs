use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{id_field, post_json, DocumentSink, PublishError, Section};
use crate::google::auth::{TokenProvider, WORKSPACE_SCOPES};

const DOCS_API_BASE: &str = "https://docs.googleapis.com/v1/documents";

/// Google Docs v1 client
pub struct GoogleDocsClient {
    client: Client,
    tokens: Arc<dyn TokenProvider>,
}

impl GoogleDocsClient {
    pub fn new(client: Client, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { client, tokens }
    }

    pub fn document_link(document_id: &str) -> String {
        format!("https://docs.google.com/document/d/{}/edit", document_id)
    }
}

/// Render sections as `== TITLE ==` blocks, in order
fn render_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|s| format!("\n== {} ==\n{}\n", s.title.to_uppercase(), s.body))
        .collect()
}

/// Insert the whole body at the start of the document in one request
fn insert_requests(sections: &[Section]) -> Value {
    json!({
        "requests": [{
            "insertText": {
                "location": { "index": 1 },
                "text": render_sections(sections),
            }
        }]
    })
}

#[async_trait]
impl DocumentSink for GoogleDocsClient {
    async fn create_document(
        &self,
        title: &str,
        sections: &[Section],
    ) -> Result<String, PublishError> {
        let token = self
            .tokens
            .access_token(&WORKSPACE_SCOPES)
            .await
            .map_err(|e| PublishError::Auth(e.to_string()))?;

        let created = post_json(&self.client, DOCS_API_BASE, &token, &json!({ "title": title })).await?;
        let document_id = id_field(&created, "documentId")?;
        tracing::debug!("[PUBLISHER] Created document {}", document_id);

        let url = format!("{}/{}:batchUpdate", DOCS_API_BASE, document_id);
        post_json(&self.client, &url, &token, &insert_requests(sections)).await?;

        let link = Self::document_link(&document_id);
        tracing::info!("[PUBLISHER] Google Doc created: {}", link);
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Section> {
        vec![
            Section::new("Campaign Summary", "Complete marketing campaign for: AI"),
            Section::new("SEO Optimized", "{}"),
        ]
    }

    #[test]
    fn test_sections_rendered_in_order() {
        assert_eq!(
            render_sections(&sections()),
            "\n== CAMPAIGN SUMMARY ==\nComplete marketing campaign for: AI\n\
             \n== SEO OPTIMIZED ==\n{}\n"
        );
    }

    #[test]
    fn test_single_insert_at_document_start() {
        let body = insert_requests(&sections());
        let requests = body["requests"].as_array().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["insertText"]["location"]["index"], 1);
        assert!(requests[0]["insertText"]["text"]
            .as_str()
            .unwrap()
            .starts_with("\n== CAMPAIGN SUMMARY =="));
    }

    #[test]
    fn test_document_link() {
        assert_eq!(
            GoogleDocsClient::document_link("abc123"),
            "https://docs.google.com/document/d/abc123/edit"
        );
    }
}

//! Workspace Publisher
//!
//! Renders a completed [`CampaignRecord`] into a Google Doc and a Slides
//! deck. The two creates are independent: a failure in one is recorded in
//! its own error field and does not stop the other.

mod docs;
mod slides;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::payload::{CampaignRecord, StagePayload};

pub use docs::GoogleDocsClient;
pub use slides::GoogleSlidesClient;

pub const DOCUMENT_TITLE: &str = "Marketing Campaign Summary";
pub const PRESENTATION_TITLE: &str = "Marketing Summary";

/// Maximum characters of body text placed on one slide
pub const SLIDE_BODY_LIMIT: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Workspace API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Campaign did not complete; nothing to publish")]
    IncompleteRecord,
}

/// Titled block of text, one per document section or slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub body: String,
}

impl Section {
    fn new(title: &'static str, body: impl Into<String>) -> Self {
        Self {
            title,
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Create a new document and return its link
    async fn create_document(
        &self,
        title: &str,
        sections: &[Section],
    ) -> Result<String, PublishError>;
}

#[async_trait]
pub trait SlideSink: Send + Sync {
    /// Create a new presentation, one slide per section, and return its link
    async fn create_presentation(
        &self,
        title: &str,
        slides: &[Section],
    ) -> Result<String, PublishError>;
}

/// Links and errors from one publish; per target exactly one is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub doc_link: Option<String>,
    pub slide_link: Option<String>,
    pub doc_error: Option<String>,
    pub slide_error: Option<String>,
}

impl PublishResult {
    pub fn is_success(&self) -> bool {
        self.doc_error.is_none() && self.slide_error.is_none()
    }

    fn set_doc(&mut self, outcome: Result<String, PublishError>) {
        match outcome {
            Ok(link) => self.doc_link = Some(link),
            Err(e) => self.doc_error = Some(e.to_string()),
        }
    }

    fn set_slides(&mut self, outcome: Result<String, PublishError>) {
        match outcome {
            Ok(link) => self.slide_link = Some(link),
            Err(e) => self.slide_error = Some(e.to_string()),
        }
    }
}

/// First `limit` characters of `text` (Unicode scalar values)
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn pretty<T: Into<StagePayload> + Clone>(payload: Option<&T>) -> String {
    payload
        .map(|p| Into::<StagePayload>::into(p.clone()).to_pretty_json())
        .unwrap_or_default()
}

pub struct WorkspacePublisher<D, S> {
    docs: D,
    slides: S,
}

impl<D: DocumentSink, S: SlideSink> WorkspacePublisher<D, S> {
    pub fn new(docs: D, slides: S) -> Self {
        Self { docs, slides }
    }

    /// Document sections in reading order
    pub fn document_sections(record: &CampaignRecord) -> Vec<Section> {
        vec![
            Section::new("Campaign Summary", record.summary()),
            Section::new("Trend Analysis", pretty(record.trends())),
            Section::new("Content Copy", pretty(record.copy())),
            Section::new("Visual Assets", pretty(record.visuals())),
            Section::new("Edited Content", pretty(record.edited())),
            Section::new("SEO Optimized", pretty(record.seo())),
        ]
    }

    /// Slide sections with bodies capped at [`SLIDE_BODY_LIMIT`]
    pub fn slide_sections(record: &CampaignRecord) -> Vec<Section> {
        let keywords = record
            .trends()
            .map(|t| t.trending_keywords.join(", "))
            .unwrap_or_default();
        let main_copy = record.copy().map(|c| c.blog.as_str()).unwrap_or_default();
        let seo_blog = record.seo().map(|s| s.blog.as_str()).unwrap_or_default();

        [
            ("Campaign Overview", record.summary()),
            ("Key Trends", keywords.as_str()),
            ("Main Copy", main_copy),
            ("SEO Highlights", seo_blog),
        ]
        .into_iter()
        .map(|(title, body)| Section::new(title, truncate_chars(body, SLIDE_BODY_LIMIT)))
        .collect()
    }

    pub async fn publish(&self, record: &CampaignRecord) -> PublishResult {
        let mut result = PublishResult::default();

        if !record.is_complete() {
            tracing::warn!("[PUBLISHER] Refusing to publish incomplete campaign");
            let message = PublishError::IncompleteRecord.to_string();
            result.doc_error = Some(message.clone());
            result.slide_error = Some(message);
            return result;
        }

        tracing::info!("[PUBLISHER] Creating document");
        let doc = self
            .docs
            .create_document(DOCUMENT_TITLE, &Self::document_sections(record))
            .await;
        if let Err(e) = &doc {
            tracing::error!("[PUBLISHER] Document creation failed: {}", e);
        }
        result.set_doc(doc);

        tracing::info!("[PUBLISHER] Creating presentation");
        let slides = self
            .slides
            .create_presentation(PRESENTATION_TITLE, &Self::slide_sections(record))
            .await;
        if let Err(e) = &slides {
            tracing::error!("[PUBLISHER] Presentation creation failed: {}", e);
        }
        result.set_slides(slides);

        result
    }
}

/// POST a JSON body with a bearer token and return the JSON reply
pub(crate) async fn post_json(
    client: &Client,
    url: &str,
    token: &str,
    body: &serde_json::Value,
) -> Result<serde_json::Value, PublishError> {
    let response = client.post(url).bearer_auth(token).json(body).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        return Err(PublishError::Api { status, message });
    }

    Ok(response.json().await?)
}

/// Extract a string id field from a create response
pub(crate) fn id_field(reply: &serde_json::Value, field: &str) -> Result<String, PublishError> {
    reply
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| PublishError::Api {
            status: 200,
            message: format!("response missing {}", field),
        })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use super::*;
    use crate::{
        payload::{
            CampaignRequest, EditedContent, RecordBuilder, SeoContent, TrendData, VisualAssets,
            WrittenContent,
        },
        stages::Stage,
    };

    #[derive(Default)]
    struct FakeDocs {
        creates: AtomicUsize,
        fail: bool,
        sections: Mutex<Vec<Section>>,
    }

    #[async_trait]
    impl DocumentSink for Arc<FakeDocs> {
        async fn create_document(
            &self,
            _title: &str,
            sections: &[Section],
        ) -> Result<String, PublishError> {
            let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(PublishError::Api {
                    status: 403,
                    message: "docs disabled".into(),
                });
            }
            *self.sections.lock().unwrap() = sections.to_vec();
            Ok(format!("https://docs.google.com/document/d/doc{}/edit", n))
        }
    }

    #[derive(Default)]
    struct FakeSlides {
        creates: AtomicUsize,
        fail: bool,
        slides: Mutex<Vec<Section>>,
    }

    #[async_trait]
    impl SlideSink for Arc<FakeSlides> {
        async fn create_presentation(
            &self,
            _title: &str,
            slides: &[Section],
        ) -> Result<String, PublishError> {
            let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(PublishError::Auth("token expired".into()));
            }
            *self.slides.lock().unwrap() = slides.to_vec();
            Ok(format!("https://docs.google.com/presentation/d/deck{}/edit", n))
        }
    }

    fn completed_record(blog: &str) -> CampaignRecord {
        let mut builder = RecordBuilder::new(CampaignRequest::default());
        builder.insert(
            TrendData {
                trending_keywords: vec!["AI".into(), "automation".into()],
                source: "test".into(),
            }
            .into(),
        );
        builder.insert(
            WrittenContent {
                blog: blog.into(),
                ..Default::default()
            }
            .into(),
        );
        builder.insert(VisualAssets::default().into());
        builder.insert(EditedContent::default().into());
        builder.insert(
            SeoContent {
                blog: format!("[SEO Optimized] {}", blog),
                ..Default::default()
            }
            .into(),
        );
        builder.finish()
    }

    #[test]
    fn test_truncate_chars() {
        let long = "é".repeat(1500);
        assert_eq!(truncate_chars(&long, SLIDE_BODY_LIMIT).chars().count(), 1000);

        let short = "short body";
        assert_eq!(truncate_chars(short, SLIDE_BODY_LIMIT), short);

        let exact = "x".repeat(1000);
        assert_eq!(truncate_chars(&exact, SLIDE_BODY_LIMIT), exact);
    }

    #[tokio::test]
    async fn test_publishes_both_targets() {
        let docs = Arc::new(FakeDocs::default());
        let slides = Arc::new(FakeSlides::default());
        let publisher = WorkspacePublisher::new(docs.clone(), slides.clone());

        let result = publisher.publish(&completed_record(&"b".repeat(1200))).await;

        assert!(result.is_success());
        assert_eq!(
            result.doc_link.as_deref(),
            Some("https://docs.google.com/document/d/doc1/edit")
        );
        assert!(result.slide_link.is_some());

        let sections = docs.sections.lock().unwrap();
        let titles: Vec<_> = sections.iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec![
                "Campaign Summary",
                "Trend Analysis",
                "Content Copy",
                "Visual Assets",
                "Edited Content",
                "SEO Optimized"
            ]
        );
        assert!(sections[2].body.chars().count() > 1000);

        let slides = slides.slides.lock().unwrap();
        assert_eq!(slides.len(), 4);
        assert_eq!(slides[1].body, "AI, automation");
        assert_eq!(slides[2].body.chars().count(), 1000);
        assert_eq!(slides[3].body.chars().count(), 1000);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_the_other() {
        let docs = Arc::new(FakeDocs {
            fail: true,
            ..Default::default()
        });
        let slides = Arc::new(FakeSlides::default());
        let publisher = WorkspacePublisher::new(docs.clone(), slides.clone());

        let result = publisher.publish(&completed_record("blog")).await;

        assert!(result.doc_link.is_none());
        assert!(result.doc_error.as_deref().unwrap().contains("403"));
        assert!(result.slide_link.is_some());
        assert!(result.slide_error.is_none());
        assert!(!result.is_success());

        let docs = Arc::new(FakeDocs::default());
        let slides = Arc::new(FakeSlides {
            fail: true,
            ..Default::default()
        });
        let result = WorkspacePublisher::new(docs, slides)
            .publish(&completed_record("blog"))
            .await;
        assert!(result.doc_link.is_some());
        assert!(result.slide_error.unwrap().contains("token expired"));
    }

    #[tokio::test]
    async fn test_replay_creates_new_documents() {
        let docs = Arc::new(FakeDocs::default());
        let slides = Arc::new(FakeSlides::default());
        let publisher = WorkspacePublisher::new(docs.clone(), slides.clone());
        let record = completed_record("blog");

        let first = publisher.publish(&record).await;
        let second = publisher.publish(&record).await;

        assert_eq!(docs.creates.load(Ordering::SeqCst), 2);
        assert_eq!(slides.creates.load(Ordering::SeqCst), 2);
        assert_ne!(first.doc_link, second.doc_link);
    }

    #[tokio::test]
    async fn test_failed_record_is_not_published() {
        let docs = Arc::new(FakeDocs::default());
        let slides = Arc::new(FakeSlides::default());
        let publisher = WorkspacePublisher::new(docs.clone(), slides.clone());
        let record = RecordBuilder::new(CampaignRequest::default()).fail(Stage::Trend, "down".into());

        let result = publisher.publish(&record).await;

        assert_eq!(docs.creates.load(Ordering::SeqCst), 0);
        assert_eq!(slides.creates.load(Ordering::SeqCst), 0);
        assert!(result.doc_link.is_none() && result.slide_link.is_none());
        assert_eq!(
            result.doc_error.as_deref(),
            Some("Campaign did not complete; nothing to publish")
        );
        assert_eq!(result.doc_error, result.slide_error);
    }
}

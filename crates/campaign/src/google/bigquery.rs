//! Trending terms from the public Google Trends dataset in BigQuery

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::auth::{TokenProvider, BIGQUERY_SCOPE};
use crate::{
    payload::CampaignRequest,
    stages::{Stage, StageError, TrendSource},
};

const BIGQUERY_API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Latest refresh of the top terms, best rank first
const TOP_TERMS_QUERY: &str = "\
SELECT term, MIN(rank) AS best_rank \
FROM `bigquery-public-data.google_trends.top_terms` \
WHERE refresh_date = (SELECT MAX(refresh_date) FROM `bigquery-public-data.google_trends.top_terms`) \
GROUP BY term \
ORDER BY best_rank \
LIMIT 500";

const QUERY_TIMEOUT_MS: u64 = 30_000;

pub struct BigQueryTrendSource {
    client: Client,
    tokens: Arc<dyn TokenProvider>,
    project_id: String,
}

impl BigQueryTrendSource {
    pub fn new(client: Client, tokens: Arc<dyn TokenProvider>, project_id: impl Into<String>) -> Self {
        Self {
            client,
            tokens,
            project_id: project_id.into(),
        }
    }

    async fn top_terms(&self) -> Result<Vec<String>, StageError> {
        let token = self
            .tokens
            .access_token(&[BIGQUERY_SCOPE])
            .await
            .map_err(|e| StageError::Auth(e.to_string()))?;

        let url = format!("{}/projects/{}/queries", BIGQUERY_API_BASE, self.project_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&QueryRequest {
                query: TOP_TERMS_QUERY,
                use_legacy_sql: false,
                timeout_ms: QUERY_TIMEOUT_MS,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::collaborator(
                Stage::Trend,
                format!("BigQuery API error ({}): {}", status, body),
            ));
        }

        let parsed: QueryResponse = response.json().await?;
        if !parsed.job_complete {
            return Err(StageError::collaborator(
                Stage::Trend,
                "BigQuery query did not complete in time",
            ));
        }
        Ok(parsed.first_column())
    }
}

#[async_trait]
impl TrendSource for BigQueryTrendSource {
    fn name(&self) -> &str {
        "bigquery:google_trends.top_terms"
    }

    async fn fetch_trends(&self, request: &CampaignRequest) -> Result<Vec<String>, StageError> {
        let terms = self.top_terms().await?;
        tracing::debug!("[TREND_AGENT] BigQuery returned {} top terms", terms.len());
        Ok(related_terms(request.as_str(), terms))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    f: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(default)]
    v: Option<serde_json::Value>,
}

impl QueryResponse {
    fn first_column(self) -> Vec<String> {
        self.rows
            .into_iter()
            .filter_map(|row| row.f.into_iter().next())
            .filter_map(|cell| match cell.v {
                Some(serde_json::Value::String(s)) => Some(s),
                _ => None,
            })
            .collect()
    }
}

/// Words too common to relate a term to the request
const STOPWORDS: &[&str] = &[
    "an", "and", "as", "at", "by", "for", "from", "in", "is", "of", "on", "or", "the", "to",
    "vs", "with",
];

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Keep terms sharing at least one word (two characters or more, not a
/// stopword, case-insensitive) with the request, preserving rank order
fn related_terms(request: &str, terms: Vec<String>) -> Vec<String> {
    let wanted = words(request);
    if wanted.is_empty() {
        return Vec::new();
    }
    terms
        .into_iter()
        .filter(|term| !words(term).is_disjoint(&wanted))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_rows() {
        let json = r#"{
            "kind": "bigquery#queryResponse",
            "jobComplete": true,
            "rows": [
                {"f": [{"v": "ai tools"}, {"v": "1"}]},
                {"f": [{"v": null}, {"v": "2"}]},
                {"f": [{"v": "home automation"}, {"v": "3"}]}
            ]
        }"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert!(response.job_complete);
        assert_eq!(response.first_column(), vec!["ai tools", "home automation"]);
    }

    #[test]
    fn test_incomplete_job_has_no_rows() {
        let response: QueryResponse =
            serde_json::from_str(r#"{"jobComplete": false}"#).unwrap();
        assert!(!response.job_complete);
        assert!(response.first_column().is_empty());
    }

    #[test]
    fn test_related_terms_share_a_word() {
        let terms = vec![
            "AI Tools".to_string(),
            "weather tomorrow".to_string(),
            "automation jobs".to_string(),
            "aid package".to_string(),
        ];
        assert_eq!(
            related_terms("AI tools and automation", terms),
            vec!["AI Tools", "automation jobs"]
        );
    }

    #[test]
    fn test_single_letter_words_ignored() {
        let terms = vec!["a cup of tea".to_string(), "x games".to_string()];
        assert!(related_terms("a x", terms).is_empty());
    }

    #[test]
    fn test_stopwords_do_not_relate_terms() {
        let terms = vec![
            "rock and roll".to_string(),
            "the voice".to_string(),
            "tools for kids".to_string(),
        ];
        assert_eq!(
            related_terms("AI tools and automation", terms),
            vec!["tools for kids"]
        );
        assert!(related_terms("and the of", vec!["and more".to_string()]).is_empty());
    }

    #[test]
    fn test_request_is_built_for_standard_sql() {
        let body = serde_json::to_value(QueryRequest {
            query: TOP_TERMS_QUERY,
            use_legacy_sql: false,
            timeout_ms: QUERY_TIMEOUT_MS,
        })
        .unwrap();
        assert_eq!(body["useLegacySql"], false);
        assert!(body["query"].as_str().unwrap().contains("google_trends.top_terms"));
    }
}

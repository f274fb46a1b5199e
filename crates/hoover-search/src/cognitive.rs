//! HTTP client for the hosted cognitive search service.
//!
//! Issues `POST {endpoint}/indexes/{index}/docs/search` with the query key in
//! the `api-key` header and returns the `enriched` field of each document.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use hoover_core::config::SearchConfig;
use hoover_core::SearchHit;

use crate::error::SearchError;
use crate::SearchBackend;

/// Per-request ceiling enforced by the HTTP client itself.
const HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    search: &'a str,
    top: usize,
    select: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    value: Vec<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "@search.score", default)]
    score: f64,
    #[serde(default)]
    enriched: Option<String>,
}

/// Client for one index of the hosted search service.
pub struct CognitiveSearchClient {
    http: Client,
    endpoint: String,
    index: String,
    api_key: String,
    api_version: String,
}

impl CognitiveSearchClient {
    /// Create a client from the search configuration.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        if config.api_key.is_empty() {
            return Err(SearchError::Config("search api key is empty".to_string()));
        }
        if config.index.is_empty() {
            return Err(SearchError::Config("search index is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| SearchError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint_url(),
            index: config.index.clone(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        })
    }

    /// Full URL of the search endpoint.
    pub fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, self.index, self.api_version
        )
    }
}

#[async_trait]
impl SearchBackend for CognitiveSearchClient {
    fn name(&self) -> &'static str {
        "cognitive"
    }

    async fn search(&self, query: &str, top: usize) -> Result<Vec<SearchHit>, SearchError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let body = SearchRequest {
            search: query,
            top,
            select: "enriched",
        };

        let response = self
            .http
            .post(self.search_url())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: SearchResponse = response.json().await?;
        tracing::debug!(
            index = %self.index,
            hits = parsed.value.len(),
            "Search service responded"
        );

        Ok(parsed
            .value
            .into_iter()
            .map(|doc| SearchHit {
                score: doc.score,
                enriched: doc.enriched,
            })
            .collect())
    }
}

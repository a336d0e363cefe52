//! Tavily search provider
//!
//! Uses the `/search` endpoint for ranked results and `/extract` for full
//! page content.

use crate::search::{PageContent, SearchHit, SearchProvider};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResultItem>,
}

#[derive(Debug, Deserialize)]
struct SearchResultItem {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    urls: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    results: Vec<ExtractResultItem>,
    #[serde(default)]
    failed_results: Vec<FailedExtraction>,
}

#[derive(Debug, Deserialize)]
struct ExtractResultItem {
    url: String,
    #[serde(default)]
    raw_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FailedExtraction {
    #[serde(default)]
    error: Option<String>,
}

pub struct TavilySearch {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TavilySearch {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Tavily request to {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Tavily {} failed ({}): {}",
                path, status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Tavily response: {}", e)))
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let request = SearchRequest {
            query,
            max_results,
            include_raw_content: false,
        };

        let response: SearchResponse = self.post("/search", &request).await?;
        debug!(query, hits = response.results.len(), "Tavily search completed");

        Ok(response
            .results
            .into_iter()
            .take(max_results)
            .map(|item| SearchHit {
                title: item.title,
                url: item.url,
                snippet: item.content,
            })
            .collect())
    }

    async fn fetch_content(&self, url: &str) -> Result<PageContent> {
        let request = ExtractRequest { urls: [url] };
        let response: ExtractResponse = self.post("/extract", &request).await?;

        match response.results.into_iter().next() {
            Some(item) => Ok(PageContent {
                url: item.url,
                raw_content: item.raw_content.unwrap_or_default(),
            }),
            None => {
                let reason = response
                    .failed_results
                    .into_iter()
                    .find_map(|f| f.error)
                    .unwrap_or_else(|| "no content returned".to_string());
                Err(AppError::Upstream(format!(
                    "Tavily could not extract {}: {}",
                    url, reason
                )))
            }
        }
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_shape() {
        let request = SearchRequest {
            query: "rust async",
            max_results: 1,
            include_raw_content: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["query"], "rust async");
        assert_eq!(value["max_results"], 1);
        assert_eq!(value["include_raw_content"], false);
    }

    #[test]
    fn test_extract_response_with_failures_parses() {
        let response: ExtractResponse = serde_json::from_str(
            r#"{"results": [], "failed_results": [{"url": "https://x", "error": "blocked"}]}"#,
        )
        .unwrap();
        assert!(response.results.is_empty());
        assert_eq!(response.failed_results[0].error.as_deref(), Some("blocked"));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let search =
            TavilySearch::new("https://api.tavily.com/", "key".into(), Duration::from_secs(5))
                .unwrap();
        assert_eq!(search.base_url, "https://api.tavily.com");
        assert_eq!(search.name(), "tavily");
    }
}

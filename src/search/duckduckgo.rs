//! Search provider implementation using daedra
//!
//! daedra uses DuckDuckGo as the search backend and converts fetched pages
//! to markdown, which is what the summarizer reads.

use crate::search::{PageContent, SearchHit, SearchProvider};
use crate::types::{AppError, Result};
use async_trait::async_trait;

/// Web search and page fetching powered by daedra
pub struct DuckDuckGoSearch;

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Upstream(format!("Search failed: {}", e)))?;

        Ok(response
            .data
            .iter()
            .take(max_results)
            .map(|r| SearchHit {
                title: r.title.to_string(),
                url: r.url.to_string(),
                snippet: Some(r.description.to_string()),
            })
            .collect())
    }

    async fn fetch_content(&self, url: &str) -> Result<PageContent> {
        let fetch_args = daedra::VisitPageArgs {
            url: url.to_string(),
            include_images: false,
            selector: None,
        };

        let page = daedra::tools::fetch::fetch_page(&fetch_args)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to fetch page: {}", e)))?;

        Ok(PageContent {
            url: page.url.to_string(),
            raw_content: page.content.to_string(),
        })
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

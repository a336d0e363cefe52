//! Web Search Providers
//!
//! Research branches find and read sources through [`SearchProvider`]: one call
//! to rank results for a query and one call to fetch the full content of a URL.
//! Truncating fetched content to a prompt budget is the caller's job, not the
//! provider's.
//!
//! # Providers
//!
//! - [`duckduckgo::DuckDuckGoSearch`] - DuckDuckGo via daedra (feature `duckduckgo`, default)
//! - [`tavily::TavilySearch`] - Tavily search and extract REST API

#[cfg(feature = "duckduckgo")]
pub mod duckduckgo;
pub mod tavily;

use crate::types::{AppError, Result};
use crate::utils::toml_config::{SearchConfig, SearchProviderKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

/// Full content extracted from a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub url: String,
    pub raw_content: String,
}

/// Web search and content extraction capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` and return at most `max_results` ranked hits
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;

    /// Fetch the full content of `url`
    async fn fetch_content(&self, url: &str) -> Result<PageContent>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Create the configured search provider
pub fn create_provider(config: &SearchConfig) -> Result<Arc<dyn SearchProvider>> {
    match config.provider {
        SearchProviderKind::DuckDuckGo => create_duckduckgo(),
        SearchProviderKind::Tavily => {
            let api_key = config.api_key().ok_or_else(|| {
                AppError::Configuration(format!(
                    "Tavily search requires the '{}' environment variable",
                    config.api_key_env
                ))
            })?;
            Ok(Arc::new(tavily::TavilySearch::new(
                &config.base_url,
                api_key,
                config.timeout(),
            )?))
        }
    }
}

#[cfg(feature = "duckduckgo")]
fn create_duckduckgo() -> Result<Arc<dyn SearchProvider>> {
    Ok(Arc::new(duckduckgo::DuckDuckGoSearch::new()))
}

#[cfg(not(feature = "duckduckgo"))]
fn create_duckduckgo() -> Result<Arc<dyn SearchProvider>> {
    Err(AppError::Configuration(
        "DuckDuckGo search requires the 'duckduckgo' feature; rebuild with it or use provider = \"tavily\"".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tavily_without_key_is_configuration_error() {
        let config = SearchConfig {
            provider: SearchProviderKind::Tavily,
            api_key_env: "SCOUT_TEST_MISSING_SEARCH_KEY".to_string(),
            ..SearchConfig::default()
        };

        let err = match create_provider(&config) {
            Ok(_) => panic!("Expected configuration error"),
            Err(e) => e,
        };
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("SCOUT_TEST_MISSING_SEARCH_KEY"));
    }

    #[cfg(feature = "duckduckgo")]
    #[test]
    fn test_default_provider_is_duckduckgo() {
        let provider = create_provider(&SearchConfig::default()).unwrap();
        assert_eq!(provider.name(), "duckduckgo");
    }
}

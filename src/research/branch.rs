//! Research branch: search, fetch, truncate, summarize for one query.

use crate::llm::LLMClient;
use crate::research::prompts;
use crate::search::{SearchHit, SearchProvider};
use crate::types::{AppError, ResearchResult, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// One unit of research work, executed once per planned query.
///
/// Cloning is cheap; every concurrent branch gets its own handle to the
/// shared providers.
#[derive(Clone)]
pub struct ResearchBranch {
    search: Arc<dyn SearchProvider>,
    llm: Arc<dyn LLMClient>,
    max_results: usize,
    max_content_chars: usize,
}

impl ResearchBranch {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        llm: Arc<dyn LLMClient>,
        max_results: usize,
        max_content_chars: usize,
    ) -> Self {
        Self {
            search,
            llm,
            max_results,
            max_content_chars,
        }
    }

    /// Research `query` on behalf of `question`.
    ///
    /// Never fails: a failed search yields no results, and a hit whose fetch
    /// or summary fails is skipped.
    pub async fn execute(&self, question: &str, query: &str) -> Vec<ResearchResult> {
        let hits = match self.search.search(query, self.max_results).await {
            Ok(hits) => hits,
            Err(e) => {
                log_failure(query, &e);
                return Vec::new();
            }
        };

        if hits.is_empty() {
            debug!(query, "Search returned no hits");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(hits.len().min(self.max_results));
        for hit in hits.into_iter().take(self.max_results) {
            match self.research_hit(question, query, hit).await {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(e) => log_failure(query, &e),
            }
        }

        results
    }

    async fn research_hit(
        &self,
        question: &str,
        query: &str,
        hit: SearchHit,
    ) -> Result<Option<ResearchResult>> {
        let page = self.search.fetch_content(&hit.url).await?;

        if page.raw_content.trim().is_empty() {
            debug!(url = %hit.url, "Fetched page has no content, skipping");
            return Ok(None);
        }

        let content = truncate_chars(&page.raw_content, self.max_content_chars);
        debug!(
            url = %hit.url,
            fetched_chars = page.raw_content.chars().count(),
            kept_chars = content.chars().count(),
            "Summarizing page"
        );

        let prompt = prompts::summarize_source(question, query, content);
        let summary = self.llm.generate(&prompt).await?;

        Ok(Some(ResearchResult {
            title: Some(hit.title),
            url: Some(hit.url),
            summary: Some(summary),
        }))
    }
}

fn log_failure(query: &str, error: &AppError) {
    let failure = AppError::BranchFailure {
        query: query.to_string(),
        reason: error.to_string(),
    };
    warn!(error = %failure, "Research branch degraded");
}

/// First `max_chars` characters of `content`; unchanged when shorter.
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((index, _)) => &content[..index],
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{MockSearchProvider, PageContent};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records prompts and answers with a fixed summary
    #[derive(Default)]
    struct RecordingLLM {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl LLMClient for RecordingLLM {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(AppError::Upstream("model offline".into()));
            }
            Ok("summary".to_string())
        }

        async fn generate_json(&self, _prompt: &str) -> Result<String> {
            unreachable!("branches never request structured output")
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    fn hit(n: usize) -> SearchHit {
        SearchHit {
            title: format!("Title {}", n),
            url: format!("https://example.com/{}", n),
            snippet: None,
        }
    }

    fn page(content: &str) -> PageContent {
        PageContent {
            url: "https://example.com/1".to_string(),
            raw_content: content.to_string(),
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 4), "abcd");
        assert_eq!(truncate_chars("abc", 4), "abc");
        assert_eq!(truncate_chars("abcd", 4), "abcd");
        assert_eq!(truncate_chars("", 4), "");
        // Multi-byte characters count once and are never split
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
    }

    #[tokio::test]
    async fn test_successful_branch_yields_one_result() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .times(1)
            .returning(|_, _| Ok(vec![hit(1)]));
        search
            .expect_fetch_content()
            .times(1)
            .returning(|_| Ok(page("page body")));

        let llm = Arc::new(RecordingLLM::default());
        let branch = ResearchBranch::new(Arc::new(search), llm.clone(), 1, 4000);

        let results = branch.execute("question?", "query").await;
        assert_eq!(results, vec![ResearchResult::new("Title 1", "https://example.com/1", "summary")]);

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("question?"));
        assert!(prompts[0].contains("page body"));
    }

    /// The summarizer prompt for a page whose body is `body`, capped at `max_chars`
    async fn summary_prompt_for(body: &str, max_chars: usize) -> String {
        let mut search = MockSearchProvider::new();
        search.expect_search().returning(|_, _| Ok(vec![hit(1)]));
        let fetched = body.to_string();
        search
            .expect_fetch_content()
            .returning(move |_| Ok(page(&fetched)));

        let llm = Arc::new(RecordingLLM::default());
        let branch = ResearchBranch::new(Arc::new(search), llm.clone(), 1, max_chars);
        branch.execute("q", "query").await;

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        prompts[0].clone()
    }

    #[tokio::test]
    async fn test_long_content_is_truncated_to_budget() {
        // Circled digits never occur in the prompt template
        let kept = "\u{2460}".repeat(50);
        let dropped = "\u{2461}".repeat(50);

        let prompt = summary_prompt_for(&(kept.clone() + &dropped), 50).await;

        let expected = format!("<SEARCH_RESULTS>\n{}\n</SEARCH_RESULTS>", kept);
        assert!(prompt.contains(&expected));
        assert!(!prompt.contains('\u{2461}'));
    }

    #[tokio::test]
    async fn test_content_within_budget_is_passed_unmodified() {
        let body = "\u{2460}".repeat(20) + " tail " + &"\u{2461}".repeat(20);

        let prompt = summary_prompt_for(&body, 50).await;

        let expected = format!("<SEARCH_RESULTS>\n{}\n</SEARCH_RESULTS>", body);
        assert!(prompt.contains(&expected));
    }

    #[tokio::test]
    async fn test_search_failure_yields_nothing() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .returning(|_, _| Err(AppError::Upstream("rate limited".into())));
        search.expect_fetch_content().never();

        let llm = Arc::new(RecordingLLM::default());
        let branch = ResearchBranch::new(Arc::new(search), llm.clone(), 1, 4000);

        assert!(branch.execute("q", "query").await.is_empty());
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_page_is_skipped_without_summarizing() {
        let mut search = MockSearchProvider::new();
        search.expect_search().returning(|_, _| Ok(vec![hit(1)]));
        search
            .expect_fetch_content()
            .returning(|_| Ok(page("   \n ")));

        let llm = Arc::new(RecordingLLM::default());
        let branch = ResearchBranch::new(Arc::new(search), llm.clone(), 1, 4000);

        assert!(branch.execute("q", "query").await.is_empty());
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_failure_skips_hit() {
        let mut search = MockSearchProvider::new();
        search.expect_search().returning(|_, _| Ok(vec![hit(1)]));
        search
            .expect_fetch_content()
            .returning(|_| Ok(page("content")));

        let llm = Arc::new(RecordingLLM {
            fail: true,
            ..Default::default()
        });
        let branch = ResearchBranch::new(Arc::new(search), llm, 1, 4000);

        assert!(branch.execute("q", "query").await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_other_hits() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .returning(|_, _| Ok(vec![hit(1), hit(2), hit(3)]));
        search.expect_fetch_content().returning(|url| {
            if url.ends_with("/2") {
                Err(AppError::Upstream("403".into()))
            } else {
                Ok(page("content"))
            }
        });

        let llm = Arc::new(RecordingLLM::default());
        let branch = ResearchBranch::new(Arc::new(search), llm, 3, 4000);

        let results = branch.execute("q", "query").await;
        let urls: Vec<_> = results.iter().map(|r| r.display_url()).collect();
        assert_eq!(urls, vec!["https://example.com/1", "https://example.com/3"]);
    }

    #[tokio::test]
    async fn test_hits_beyond_cap_are_ignored() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .returning(|_, _| Ok(vec![hit(1), hit(2)]));
        search
            .expect_fetch_content()
            .times(1)
            .returning(|_| Ok(page("content")));

        let llm = Arc::new(RecordingLLM::default());
        let branch = ResearchBranch::new(Arc::new(search), llm, 1, 4000);

        assert_eq!(branch.execute("q", "query").await.len(), 1);
    }
}

//! Mock implementations for testing.
//!
//! Scripted stand-ins for the completion model and the search provider, shared
//! by the pipeline and fan-out integration tests.

use async_trait::async_trait;
use scout::llm::LLMClient;
use scout::search::{PageContent, SearchHit, SearchProvider};
use scout::types::{AppError, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Line in the summarization prompt that carries the branch's query
const QUERY_MARKER: &str = "The results were found with the search query: ";

/// What `generate` answers with
#[derive(Clone)]
enum TextReply {
    /// `Summary of <query>` for summarization prompts, the fixed text otherwise
    Fixed(String),
    Fail,
}

/// Mock LLM client with scripted structured replies and call counters.
///
/// `generate_json` pops replies from a script; once one reply is left it is
/// repeated for every further call.
///
/// # Examples
///
/// ```ignore
/// // Planner that plans two queries and summarizes every page
/// let planner = MockLLMClient::planner(r#"{"queries": ["a", "b"]}"#);
///
/// // Writer that always answers with the same prose
/// let writer = MockLLMClient::writer("Answer citing [1].");
///
/// // Client whose every call fails
/// let broken = MockLLMClient::failing();
/// ```
pub struct MockLLMClient {
    json_script: Mutex<VecDeque<std::result::Result<String, AppError>>>,
    text: TextReply,
    generate_calls: AtomicUsize,
    json_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockLLMClient {
    fn build(json_script: Vec<std::result::Result<String, AppError>>, text: TextReply) -> Self {
        Self {
            json_script: Mutex::new(json_script.into()),
            text,
            generate_calls: AtomicUsize::new(0),
            json_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Planner returning `plan` for structured calls and a per-query summary
    pub fn planner(plan: &str) -> Self {
        Self::build(vec![Ok(plan.to_string())], TextReply::Fixed("summary".to_string()))
    }

    /// Planner whose structured replies follow `script` in order
    pub fn planner_script(script: Vec<std::result::Result<&str, AppError>>) -> Self {
        let script = script.into_iter().map(|r| r.map(str::to_string)).collect();
        Self::build(script, TextReply::Fixed("summary".to_string()))
    }

    /// Planner that plans fine but cannot summarize
    pub fn planner_without_summaries(plan: &str) -> Self {
        Self::build(vec![Ok(plan.to_string())], TextReply::Fail)
    }

    pub fn writer(answer: &str) -> Self {
        Self::build(Vec::new(), TextReply::Fixed(answer.to_string()))
    }

    pub fn failing() -> Self {
        Self::build(
            vec![Err(AppError::Upstream("Mock LLM failure".to_string()))],
            TextReply::Fail,
        )
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn json_calls(&self) -> usize {
        self.json_calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_json(&self) -> Result<String> {
        let mut script = self.json_script.lock().unwrap();
        let reply = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().map(clone_reply)
        };
        reply.unwrap_or_else(|| Err(AppError::Upstream("no structured reply scripted".to_string())))
    }
}

fn clone_reply(reply: &std::result::Result<String, AppError>) -> std::result::Result<String, AppError> {
    match reply {
        Ok(text) => Ok(text.clone()),
        Err(AppError::SchemaParse(msg)) => Err(AppError::SchemaParse(msg.clone())),
        Err(e) => Err(AppError::Upstream(e.to_string())),
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        match &self.text {
            TextReply::Fail => Err(AppError::Upstream("Mock LLM failure".to_string())),
            TextReply::Fixed(text) => match query_in_prompt(prompt) {
                Some(query) => Ok(format!("Summary of {}", query)),
                None => Ok(text.clone()),
            },
        }
    }

    async fn generate_json(&self, prompt: &str) -> Result<String> {
        self.json_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.next_json()
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

fn query_in_prompt(prompt: &str) -> Option<&str> {
    prompt
        .lines()
        .find_map(|line| line.strip_prefix(QUERY_MARKER))
        .map(str::trim)
}

/// URL the mock search provider returns for `query`
pub fn url_for(query: &str) -> String {
    format!("https://example.com/{}", query.replace(' ', "-"))
}

/// Title the mock search provider returns for `query`
pub fn title_for(query: &str) -> String {
    format!("Article on {}", query)
}

/// Mock search provider with one hit per query and per-query failure injection.
///
/// Also tracks how many searches were in flight at once.
#[derive(Default)]
pub struct MockSearchProvider {
    failing_queries: HashSet<String>,
    empty_queries: HashSet<String>,
    blank_pages: HashSet<String>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    search_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Searching `query` returns an upstream error
    pub fn fail_on(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_string());
        self
    }

    /// Searching `query` returns no hits
    pub fn empty_on(mut self, query: &str) -> Self {
        self.empty_queries.insert(query.to_string());
        self
    }

    /// The page found for `query` has no content
    pub fn blank_page_on(mut self, query: &str) -> Self {
        self.blank_pages.insert(url_for(query));
        self
    }

    pub fn delay_on(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Largest number of searches observed running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(query).copied().or(self.default_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_queries.contains(query) {
            return Err(AppError::Upstream(format!("search for '{}' failed", query)));
        }
        if self.empty_queries.contains(query) {
            return Ok(Vec::new());
        }

        Ok(vec![SearchHit {
            title: title_for(query),
            url: url_for(query),
            snippet: None,
        }])
    }

    async fn fetch_content(&self, url: &str) -> Result<PageContent> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let raw_content = if self.blank_pages.contains(url) {
            String::new()
        } else {
            format!("Full article text from {}", url)
        };
        Ok(PageContent {
            url: url.to_string(),
            raw_content,
        })
    }

    fn name(&self) -> &str {
        "mock-search"
    }
}

use crate::{
    llm::{generate_structured, LLMClient, LLMClientFactory},
    research::{branch::ResearchBranch, fan_out::FanOutReducer, prompts, state::RunState},
    search::{self, SearchProvider},
    types::{AppError, FinalAnswer, PipelineStage, Query, Result},
    utils::toml_config::ScoutConfig,
};
use chrono::Utc;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

/// Structured output of the planning stage
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryPlan {
    /// Web search queries that together answer the question
    pub queries: Vec<String>,
}

/// Tunables for one coordinator, usually taken from [`ScoutConfig`]
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub min_queries: usize,
    pub max_queries: usize,
    pub max_parse_attempts: u32,
    pub max_results: usize,
    pub max_content_chars: usize,
    pub run_timeout: Option<Duration>,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            min_queries: 3,
            max_queries: 5,
            max_parse_attempts: 1,
            max_results: 1,
            max_content_chars: 4000,
            run_timeout: None,
        }
    }
}

impl From<&ScoutConfig> for CoordinatorSettings {
    fn from(config: &ScoutConfig) -> Self {
        Self {
            min_queries: config.pipeline.min_queries,
            max_queries: config.pipeline.max_queries,
            max_parse_attempts: config.pipeline.max_parse_attempts,
            max_results: config.search.max_results,
            max_content_chars: config.search.max_content_chars,
            run_timeout: config.pipeline.run_timeout(),
        }
    }
}

/// Drives one question through plan, research and synthesis.
///
/// The planner model writes the queries and the per-source summaries; the
/// writer model produces the final answer.
pub struct ResearchCoordinator {
    planner: Arc<dyn LLMClient>,
    writer: Arc<dyn LLMClient>,
    search: Arc<dyn SearchProvider>,
    settings: CoordinatorSettings,
}

impl ResearchCoordinator {
    pub fn new(
        planner: Arc<dyn LLMClient>,
        writer: Arc<dyn LLMClient>,
        search: Arc<dyn SearchProvider>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            planner,
            writer,
            search,
            settings,
        }
    }

    /// Build both model clients and the search provider from configuration
    pub fn from_config(config: &ScoutConfig) -> Result<Self> {
        let factory = LLMClientFactory::new(config.llm.clone());
        let planner = factory.create(&config.models.planner)?;
        let writer = factory.create(&config.models.writer)?;
        let search = search::create_provider(&config.search)?;

        info!(
            endpoint = factory.endpoint(),
            planner = planner.model_name(),
            writer = writer.model_name(),
            search = search.name(),
            "Research coordinator ready"
        );

        Ok(Self::new(planner, writer, search, CoordinatorSettings::from(config)))
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Answer `question`, honoring the configured run timeout
    pub async fn run(&self, question: &str) -> Result<FinalAnswer> {
        self.run_with_cancellation(question, CancellationToken::new())
            .await
    }

    /// Answer `question`, stopping early when `cancel` fires or the run
    /// timeout elapses. Either way the run ends with [`AppError::Cancelled`].
    ///
    /// A timeout leaves `cancel` itself untouched, so one token can be shared
    /// by several runs.
    pub async fn run_with_cancellation(
        &self,
        question: &str,
        cancel: CancellationToken,
    ) -> Result<FinalAnswer> {
        let mut state = RunState::new(question)?;
        let span = info_span!("research_run", run_id = %state.id());

        let timeout = self.settings.run_timeout;
        let run = async {
            let started = Instant::now();
            info!(question = state.question(), "Research run started");

            let run_cancel = cancel.child_token();
            let outcome = match timeout {
                Some(limit) => {
                    let drive = self.drive(&mut state, &run_cancel);
                    tokio::pin!(drive);
                    tokio::select! {
                        outcome = &mut drive => outcome,
                        _ = tokio::time::sleep(limit) => {
                            warn!(timeout_ms = limit.as_millis() as u64, "Run timeout elapsed, cancelling");
                            run_cancel.cancel();
                            drive.await
                        }
                    }
                }
                None => self.drive(&mut state, &run_cancel).await,
            };

            match outcome {
                Ok(answer) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    info!(
                        duration_ms,
                        sources = state.results().len(),
                        "Research run completed"
                    );
                    Ok(FinalAnswer {
                        run_id: state.id(),
                        question: state.question().to_string(),
                        queries: state.queries().to_vec(),
                        sources: state.results().to_vec(),
                        answer,
                        duration_ms,
                        completed_at: Utc::now(),
                    })
                }
                Err(e) => {
                    let stage = state.stage();
                    state.fail();
                    warn!(stage = %stage, error = %e, "Research run failed");
                    Err(e)
                }
            }
        };

        run.instrument(span).await
    }

    async fn drive(&self, state: &mut RunState, cancel: &CancellationToken) -> Result<String> {
        let queries = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(AppError::Cancelled("run cancelled while planning".to_string()));
            }
            planned = self.plan(state.question()) => planned.map_err(|e| match e {
                AppError::Cancelled(_) => e,
                other => AppError::PlanningFailed(Box::new(other)),
            })?,
        };
        state.set_queries(queries)?;
        state.advance(PipelineStage::Researching)?;

        self.research(state, cancel).await?;
        state.advance(PipelineStage::Synthesizing)?;

        let answer = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(AppError::Cancelled("run cancelled while synthesizing".to_string()));
            }
            written = self.synthesize(state) => written?,
        };
        state.set_answer(answer.clone())?;
        state.advance(PipelineStage::Done)?;

        Ok(answer)
    }

    /// Ask the planner for queries, re-asking only on unparseable output
    async fn plan(&self, question: &str) -> Result<Vec<Query>> {
        let prompt = prompts::build_queries(
            question,
            self.settings.min_queries,
            self.settings.max_queries,
        );
        let attempts = self.settings.max_parse_attempts.max(1);

        let mut attempt = 1;
        let plan = loop {
            match generate_structured::<QueryPlan>(self.planner.as_ref(), &prompt).await {
                Ok(plan) => break plan,
                Err(e) if e.is_schema_parse() && attempt < attempts => {
                    warn!(attempt, error = %e, "Planner output did not match schema, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let queries = validate_queries(plan.queries, self.settings.max_queries)?;
        if queries.len() < self.settings.min_queries {
            warn!(
                planned = queries.len(),
                min = self.settings.min_queries,
                "Planner returned fewer queries than requested"
            );
        }

        info!(count = queries.len(), "Queries planned");
        for (i, query) in queries.iter().enumerate() {
            debug!(index = i, query = %query, "Planned query");
        }
        Ok(queries)
    }

    async fn research(&self, state: &mut RunState, cancel: &CancellationToken) -> Result<()> {
        let branch = ResearchBranch::new(
            self.search.clone(),
            self.planner.clone(),
            self.settings.max_results,
            self.settings.max_content_chars,
        );
        let question: Arc<str> = Arc::from(state.question());

        let (results, _stats) = FanOutReducer::new()
            .run(
                state.queries(),
                |query| {
                    let branch = branch.clone();
                    let question = question.clone();
                    async move { branch.execute(&question, &query).await }
                },
                cancel,
            )
            .await?;

        if results.is_empty() {
            return Err(AppError::NoResearchResults);
        }

        state.merge_results(results)?;
        info!(sources = state.results().len(), "Research merged");
        Ok(())
    }

    async fn synthesize(&self, state: &RunState) -> Result<String> {
        let sources = prompts::format_sources(state.results());
        let prompt = prompts::build_final_response(state.question(), &sources);

        let text = self
            .writer
            .generate(&prompt)
            .await
            .map_err(|e| AppError::SynthesisFailed(Box::new(e)))?;

        Ok(format!(
            "{}\n\nReferences:\n{}",
            text.trim_end(),
            prompts::format_references(state.results())
        ))
    }
}

/// Trim, drop blanks and cap at `max`. An empty plan is a schema failure.
fn validate_queries(raw: Vec<String>, max: usize) -> Result<Vec<Query>> {
    let total = raw.len();
    let mut queries: Vec<Query> = raw
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    if queries.is_empty() {
        return Err(AppError::SchemaParse(
            "planner returned no usable queries".to_string(),
        ));
    }

    if queries.len() > max {
        warn!(planned = queries.len(), max, "Too many queries planned, dropping the rest");
        queries.truncate(max);
    }

    if queries.len() < total {
        debug!(kept = queries.len(), total, "Query plan filtered");
    }

    Ok(queries)
}

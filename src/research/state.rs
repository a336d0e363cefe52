//! Per-run state threaded through the pipeline stages.

use crate::types::{AppError, PipelineStage, Query, ResearchResult, Result};
use uuid::Uuid;

/// The single mutable record of one research run.
///
/// Owned by the coordinator for the duration of the run. Research branches
/// never see it: they receive the question and their query by value and
/// return results by value. Each field is written by exactly one stage:
///
/// - `queries` once, while planning
/// - `results` only grows, while researching
/// - `answer` once, while synthesizing
#[derive(Debug)]
pub struct RunState {
    id: Uuid,
    question: String,
    stage: PipelineStage,
    queries: Vec<Query>,
    results: Vec<ResearchResult>,
    answer: Option<String>,
}

impl RunState {
    /// Start a run in the planning stage. The question must not be blank.
    pub fn new(question: &str) -> Result<Self> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidInput("question must not be empty".to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            question: question.to_string(),
            stage: PipelineStage::Planning,
            queries: Vec::new(),
            results: Vec::new(),
            answer: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn results(&self) -> &[ResearchResult] {
        &self.results
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    /// Move to `next`, rejecting backward or skipping transitions.
    pub fn advance(&mut self, next: PipelineStage) -> Result<()> {
        if !self.stage.can_advance_to(next) {
            return Err(AppError::Internal(format!(
                "illegal stage transition {} -> {}",
                self.stage, next
            )));
        }
        self.stage = next;
        Ok(())
    }

    /// Mark the run failed. No-op once the run is already terminal.
    pub fn fail(&mut self) {
        if !self.stage.is_terminal() {
            self.stage = PipelineStage::Failed;
        }
    }

    pub fn set_queries(&mut self, queries: Vec<Query>) -> Result<()> {
        self.expect_stage(PipelineStage::Planning, "queries")?;
        if !self.queries.is_empty() {
            return Err(AppError::Internal("queries were already planned".to_string()));
        }
        self.queries = queries;
        Ok(())
    }

    /// Append one merged batch of branch results.
    pub fn merge_results(&mut self, batch: Vec<ResearchResult>) -> Result<()> {
        self.expect_stage(PipelineStage::Researching, "results")?;
        self.results.extend(batch);
        Ok(())
    }

    pub fn set_answer(&mut self, answer: String) -> Result<()> {
        self.expect_stage(PipelineStage::Synthesizing, "answer")?;
        if self.answer.is_some() {
            return Err(AppError::Internal("answer was already written".to_string()));
        }
        self.answer = Some(answer);
        Ok(())
    }

    fn expect_stage(&self, stage: PipelineStage, field: &str) -> Result<()> {
        if self.stage != stage {
            return Err(AppError::Internal(format!(
                "{} may only be written while {}, run is {}",
                field, stage, self.stage
            )));
        }
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============= Research Types =============

/// A search query produced by the planning stage.
pub type Query = String;

/// One summarized source produced by a research branch.
///
/// A branch that fails contributes no entries at all; there is no
/// placeholder result with empty fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResearchResult {
    pub title: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
}

impl ResearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            url: Some(url.into()),
            summary: Some(summary.into()),
        }
    }

    /// Title used in prompts and the reference list
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(self.url.as_deref())
            .unwrap_or("Untitled source")
    }

    pub fn display_url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

/// The answer returned to the caller of a research run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalAnswer {
    pub run_id: Uuid,
    pub question: String,
    pub queries: Vec<Query>,
    /// Sources in citation order: `sources[0]` is `[1]` in the answer
    pub sources: Vec<ResearchResult>,
    /// Model prose followed by the `References:` block
    pub answer: String,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

/// Stages of a research run. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Planning,
    Researching,
    Synthesizing,
    Done,
    Failed,
}

impl PipelineStage {
    /// Whether `next` is a legal transition from `self`.
    pub fn can_advance_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        matches!(
            (self, next),
            (Planning, Researching)
                | (Researching, Synthesizing)
                | (Synthesizing, Done)
                | (Planning | Researching | Synthesizing, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Planning => "planning",
            PipelineStage::Researching => "researching",
            PipelineStage::Synthesizing => "synthesizing",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Transport or HTTP failure talking to the completion or search backend
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A structured completion could not be coerced into the declared schema
    #[error("Schema parse error: {0}")]
    SchemaParse(String),

    #[error("Planning failed: {0}")]
    PlanningFailed(Box<AppError>),

    #[error("No research results: every research branch failed or returned no content")]
    NoResearchResults,

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(Box<AppError>),

    /// Contained failure of one research branch. Logged, never returned from a run.
    #[error("Branch for query '{query}' failed: {reason}")]
    BranchFailure { query: String, reason: String },

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The stage a terminal run error aborted, if it belongs to one.
    pub fn failed_stage(&self) -> Option<PipelineStage> {
        match self {
            AppError::PlanningFailed(_) => Some(PipelineStage::Planning),
            AppError::NoResearchResults => Some(PipelineStage::Researching),
            AppError::SynthesisFailed(_) => Some(PipelineStage::Synthesizing),
            _ => None,
        }
    }

    /// True for schema failures, including when wrapped by the planning stage.
    pub fn is_schema_parse(&self) -> bool {
        match self {
            AppError::SchemaParse(_) => true,
            AppError::PlanningFailed(inner) | AppError::SynthesisFailed(inner) => {
                inner.is_schema_parse()
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

//! Question Research Pipeline
//!
//! Turns one natural-language question into a cited answer in three stages:
//!
//! 1. **Plan** - the planner model writes a small set of web search queries
//! 2. **Research** - one [`branch::ResearchBranch`] per query searches, fetches
//!    and summarizes concurrently; [`fan_out::FanOutReducer`] waits for all of
//!    them and merges their results
//! 3. **Synthesize** - the writer model answers from the numbered sources and a
//!    `References:` block is appended
//!
//! A branch that fails contributes nothing; the run fails only when every
//! branch came back empty.
//!
//! # Usage
//!
//! ```ignore
//! use scout::research::ResearchCoordinator;
//! use scout::utils::toml_config::ScoutConfig;
//!
//! let config = ScoutConfig::load_or_default("scout.toml")?;
//! let coordinator = ResearchCoordinator::from_config(&config)?;
//!
//! let answer = coordinator.run("How is the process of building a LLM?").await?;
//! println!("{}", answer.answer);
//! ```

pub mod branch;
pub mod coordinator;
pub mod fan_out;
pub mod prompts;
pub mod state;

pub use branch::ResearchBranch;
pub use coordinator::{CoordinatorSettings, QueryPlan, ResearchCoordinator};
pub use fan_out::{FanOutReducer, FanOutStats};
pub use state::RunState;

use crate::types::{FinalAnswer, Result};
use crate::utils::toml_config::ScoutConfig;

/// Build a coordinator from `config` and answer a single question.
pub async fn run_pipeline(config: &ScoutConfig, question: &str) -> Result<FinalAnswer> {
    ResearchCoordinator::from_config(config)?.run(question).await
}

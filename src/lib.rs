//! # Scout - parallel web research with cited answers
//!
//! Scout answers a natural-language question by planning a few web search
//! queries, researching each of them concurrently, and writing one answer
//! that cites every source it used.
//!
//! ## Overview
//!
//! Scout can be used in two ways:
//!
//! 1. **As a CLI** - Run `scout ask "your question"`
//! 2. **As a library** - Drive a [`ResearchCoordinator`] from your own code
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use scout::{ResearchCoordinator, ScoutConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScoutConfig::load_or_default("scout.toml")?;
//!     let coordinator = ResearchCoordinator::from_config(&config)?;
//!
//!     let answer = coordinator.run("How is the process of building a LLM?").await?;
//!     println!("{}", answer.answer);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Custom Backends
//!
//! Both external services sit behind traits, so tests and embedders can swap
//! them out:
//!
//! ```rust,ignore
//! use scout::{CoordinatorSettings, ResearchCoordinator};
//! use std::sync::Arc;
//!
//! let coordinator = ResearchCoordinator::new(
//!     Arc::new(my_planner),   // impl LLMClient
//!     Arc::new(my_writer),    // impl LLMClient
//!     Arc::new(my_search),    // impl SearchProvider
//!     CoordinatorSettings::default(),
//! );
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `duckduckgo` | DuckDuckGo search via daedra (default) |
//!
//! ## Modules
//!
//! - [`llm`] - Chat-completions client and structured output extraction
//! - [`research`] - Planning, fan-out research and synthesis
//! - [`search`] - Web search and page content providers
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration and logging bootstrap

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line interface parsing and output.
pub mod cli;
/// LLM client abstraction and the chat-completions backend.
pub mod llm;
/// Research pipeline: plan, fan out, synthesize.
pub mod research;
/// Web search providers (DuckDuckGo, Tavily).
pub mod search;
/// Core types (results, answers, errors).
pub mod types;
/// Configuration and logging utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, LLMClientFactory};
pub use research::{run_pipeline, CoordinatorSettings, ResearchCoordinator};
pub use search::{SearchHit, SearchProvider};
pub use types::{AppError, FinalAnswer, PipelineStage, ResearchResult, Result};
pub use utils::toml_config::ScoutConfig;

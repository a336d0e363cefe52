//! LLM Clients and Abstractions
//!
//! This module provides the text-completion capability the research pipeline
//! depends on. It abstracts the inference backend behind a common trait, so the
//! pipeline never sees HTTP.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait: free-text and JSON-only completions
//! - [`LLMClientFactory`] - Creates one client per configured model profile
//! - [`ChatCompletionsClient`] - HTTP implementation of the chat-completions contract
//! - [`structured`] - Lenient-then-strict extraction of typed values from model output
//!
//! # Example
//!
//! ```ignore
//! use scout::llm::{generate_structured, LLMClientFactory};
//!
//! let factory = LLMClientFactory::new(config.llm.clone());
//! let planner = factory.create(&config.models.planner)?;
//!
//! let plan: QueryPlan = generate_structured(planner.as_ref(), "Plan searches for ...").await?;
//! ```

/// Chat-completions HTTP client.
pub mod chat_completions;
/// Core LLM client trait and model profiles.
pub mod client;
/// Structured (JSON) output extraction.
pub mod structured;

pub use chat_completions::ChatCompletionsClient;
pub use client::{LLMClient, LLMClientFactory, ModelProfile};
pub use structured::{extract_json, generate_structured};

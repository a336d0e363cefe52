//! LLM Client abstractions and model profiles
//!
//! The research pipeline talks to language models through [`LLMClient`] only.
//! Two model profiles are configured (a fast planner/summarizer and a final
//! writer); both are instances of the same client type and differ only in
//! their [`ModelProfile`].

use crate::types::Result;
use crate::utils::toml_config::{LlmConfig, ModelConfig};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Generic LLM client trait for provider abstraction
///
/// Implementations must be cheap to share across concurrently running
/// research branches.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a free-text completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate a completion that is expected to contain a single JSON object.
    ///
    /// Implementations append the JSON-only instruction from
    /// [`crate::llm::structured::with_json_instruction`] and may use a different
    /// sampling temperature. The raw response text is returned unparsed; use
    /// [`crate::llm::structured::generate_structured`] to obtain a typed value.
    async fn generate_json(&self, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Sampling and transport settings for one configured model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelProfile {
    pub model: String,
    pub temperature: f32,
    /// Temperature used for [`LLMClient::generate_json`]
    pub structured_temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl From<&ModelConfig> for ModelProfile {
    fn from(config: &ModelConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            structured_temperature: config.structured_temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Configuration-based client factory
///
/// Holds the shared endpoint settings and creates one client per model profile.
///
/// # Example
///
/// ```rust,ignore
/// use scout::llm::LLMClientFactory;
///
/// let factory = LLMClientFactory::new(config.llm.clone());
/// let planner = factory.create(&config.models.planner)?;
/// let writer = factory.create(&config.models.writer)?;
/// ```
pub struct LLMClientFactory {
    llm: LlmConfig,
}

impl LLMClientFactory {
    pub fn new(llm: LlmConfig) -> Self {
        Self { llm }
    }

    /// Create a client for the given model profile
    pub fn create(&self, model: &ModelConfig) -> Result<Arc<dyn LLMClient>> {
        let client = super::chat_completions::ChatCompletionsClient::new(
            &self.llm.endpoint,
            self.llm.api_key(),
            ModelProfile::from(model),
        )?;
        Ok(Arc::new(client))
    }

    pub fn endpoint(&self) -> &str {
        &self.llm.endpoint
    }
}

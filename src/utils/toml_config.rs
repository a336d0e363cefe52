//! TOML-based configuration for Scout
//!
//! This module provides declarative configuration for the completion endpoint,
//! the two model profiles, the search provider, pipeline limits and logging via
//! a TOML file (`scout.toml`).
//!
//! Every field has a default, so an absent default config file is not an error.
//! Secrets are never stored in the file: the file names the environment
//! variable that holds them.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_FILE: &str = "scout.toml";

/// Root configuration structure loaded from scout.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============= LLM Endpoint Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the chat-completions server
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Environment variable containing the API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
}

fn default_llm_endpoint() -> String {
    "http://127.0.0.1:52576".to_string()
}

fn default_llm_api_key_env() -> String {
    "FOUNDRY_API_KEY".to_string()
}

/// Key sent when the configured variable is unset; local servers ignore it
const LOCAL_API_KEY: &str = "local";

impl LlmConfig {
    /// Resolve the API key from the environment
    pub fn api_key(&self) -> String {
        env::var(&self.api_key_env).unwrap_or_else(|_| LOCAL_API_KEY.to_string())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key_env: default_llm_api_key_env(),
        }
    }
}

// ============= Model Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Fast model used to plan queries and summarize pages
    #[serde(default = "ModelConfig::planner")]
    pub planner: ModelConfig,

    /// Model used to write the final answer
    #[serde(default = "ModelConfig::writer")]
    pub writer: ModelConfig,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            planner: ModelConfig::planner(),
            writer: ModelConfig::writer(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name/identifier sent to the endpoint
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Temperature for JSON-only completions
    #[serde(default = "default_structured_temperature")]
    pub structured_temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_structured_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    512
}

fn default_model_timeout() -> u64 {
    120
}

impl ModelConfig {
    pub fn planner() -> Self {
        Self {
            model: "Phi-4-mini-instruct-generic-gpu:5".to_string(),
            temperature: default_temperature(),
            structured_temperature: default_structured_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_model_timeout(),
        }
    }

    pub fn writer() -> Self {
        Self {
            model: "deepseek-r1-distill-qwen-7b-generic-gpu:3".to_string(),
            temperature: 0.3,
            structured_temperature: default_structured_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: 300,
        }
    }
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    /// DuckDuckGo via daedra, no API key
    DuckDuckGo,
    /// Tavily search + extract API
    Tavily,
}

impl SearchProviderKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "duckduckgo" | "ddg" => Some(Self::DuckDuckGo),
            "tavily" => Some(Self::Tavily),
            _ => None,
        }
    }
}

impl fmt::Display for SearchProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchProviderKind::DuckDuckGo => f.write_str("duckduckgo"),
            SearchProviderKind::Tavily => f.write_str("tavily"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_provider")]
    pub provider: SearchProviderKind,

    /// Environment variable containing the provider API key (Tavily)
    #[serde(default = "default_search_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the Tavily API
    #[serde(default = "default_tavily_base_url")]
    pub base_url: String,

    /// Search hits researched per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Fetched page content is cut to this many characters before summarizing
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

fn default_search_provider() -> SearchProviderKind {
    SearchProviderKind::DuckDuckGo
}

fn default_search_api_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}

fn default_tavily_base_url() -> String {
    "https://api.tavily.com".to_string()
}

fn default_max_results() -> usize {
    1
}

fn default_max_content_chars() -> usize {
    4000
}

fn default_search_timeout() -> u64 {
    30
}

impl SearchConfig {
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env).ok().filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            api_key_env: default_search_api_key_env(),
            base_url: default_tavily_base_url(),
            max_results: default_max_results(),
            max_content_chars: default_max_content_chars(),
            timeout_secs: default_search_timeout(),
        }
    }
}

// ============= Pipeline Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fewer planned queries than this is accepted with a warning
    #[serde(default = "default_min_queries")]
    pub min_queries: usize,

    /// Planned queries beyond this count are dropped
    #[serde(default = "default_max_queries")]
    pub max_queries: usize,

    /// Structured planning requests made before giving up on unparseable output
    #[serde(default = "default_max_parse_attempts")]
    pub max_parse_attempts: u32,

    /// Cancel the whole run after this many seconds
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
}

fn default_min_queries() -> usize {
    3
}

fn default_max_queries() -> usize {
    5
}

fn default_max_parse_attempts() -> u32 {
    1
}

impl PipelineConfig {
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_queries: default_min_queries(),
            max_queries: default_max_queries(),
            max_parse_attempts: default_max_parse_attempts(),
            run_timeout_secs: None,
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty`, `compact` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Also write logs to this file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl ScoutConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    /// and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    ///
    /// Used for the implicit default path; an explicitly requested file should
    /// go through [`ScoutConfig::load`] so a typo is reported.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration without touching the environment
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `SCOUT_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = env::var("SCOUT_LLM_ENDPOINT") {
            self.llm.endpoint = endpoint;
        }
        if let Ok(level) = env::var("SCOUT_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if let Some(provider) = env::var("SCOUT_SEARCH_PROVIDER")
            .ok()
            .and_then(|v| SearchProviderKind::parse(&v))
        {
            self.search.provider = provider;
        }
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.endpoint must not be empty".to_string(),
            ));
        }

        for (name, model) in [("planner", &self.models.planner), ("writer", &self.models.writer)] {
            Self::validate_model(name, model)?;
        }

        if self.search.max_results == 0 {
            return Err(ConfigError::ValidationError(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        if self.search.max_content_chars == 0 {
            return Err(ConfigError::ValidationError(
                "search.max_content_chars must be at least 1".to_string(),
            ));
        }
        if self.search.provider == SearchProviderKind::Tavily && self.search.api_key().is_none() {
            return Err(ConfigError::MissingEnvVar(self.search.api_key_env.clone()));
        }

        let pipeline = &self.pipeline;
        if pipeline.min_queries == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.min_queries must be at least 1".to_string(),
            ));
        }
        if pipeline.min_queries > pipeline.max_queries {
            return Err(ConfigError::ValidationError(format!(
                "pipeline.min_queries ({}) exceeds pipeline.max_queries ({})",
                pipeline.min_queries, pipeline.max_queries
            )));
        }
        if pipeline.max_parse_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_parse_attempts must be at least 1".to_string(),
            ));
        }
        if pipeline.run_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "pipeline.run_timeout_secs must be positive when set".to_string(),
            ));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format '{}' is not one of {:?}",
                self.logging.format, LOG_FORMATS
            )));
        }

        Ok(())
    }

    fn validate_model(name: &str, model: &ModelConfig) -> Result<(), ConfigError> {
        if model.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "models.{}.model must not be empty",
                name
            )));
        }
        if model.max_tokens == 0 {
            return Err(ConfigError::ValidationError(format!(
                "models.{}.max_tokens must be at least 1",
                name
            )));
        }
        for (field, value) in [
            ("temperature", model.temperature),
            ("structured_temperature", model.structured_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "models.{}.{} must be between 0.0 and 2.0 (got {})",
                    name, field, value
                )));
            }
        }
        if model.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "models.{}.timeout_secs must be positive",
                name
            )));
        }
        Ok(())
    }
}

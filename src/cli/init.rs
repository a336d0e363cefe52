//! Init command implementation
//!
//! Writes a commented `scout.toml` with every setting at its default.

use super::output::Output;
use crate::utils::toml_config::{ScoutConfig, SearchProviderKind, DEFAULT_CONFIG_FILE};
use std::fs;
use std::path::PathBuf;

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Configuration written
    Success(PathBuf),
    /// scout.toml already exists and `--force` was not given
    AlreadyExists(PathBuf),
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite an existing scout.toml
    pub force: bool,
    /// Search provider to configure
    pub search_provider: SearchProviderKind,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Scout");

    let config_path = config.path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", config_path.display()));
        output.hint("Use --force to overwrite it");
        return InitResult::AlreadyExists(config_path);
    }

    if !config.path.exists() {
        if let Err(e) = fs::create_dir_all(&config.path) {
            output.error(&format!("Failed to create {}: {}", config.path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    let content = generate_scout_toml(config.search_provider);
    if let Err(e) = fs::write(&config_path, content) {
        output.error(&format!("Failed to write {}: {}", config_path.display(), e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", &config_path.display().to_string());

    output.header("Next Steps");
    if config.search_provider == SearchProviderKind::Tavily {
        output.info("Export your Tavily key:");
        output.command("export TAVILY_API_KEY=tvly-...");
    }
    output.info("Start your chat-completions server, then ask a question:");
    output.command("scout ask \"How is the process of building a LLM?\"");

    InitResult::Success(config_path)
}

fn generate_scout_toml(provider: SearchProviderKind) -> String {
    let defaults = ScoutConfig::default();
    let planner = &defaults.models.planner;
    let writer = &defaults.models.writer;

    format!(
        r#"# Scout configuration
# Every value below is the built-in default; delete what you don't change.

[llm]
# Base URL of an OpenAI-style chat-completions server
endpoint = "{endpoint}"
# Environment variable holding the API key ("local" is sent when unset)
api_key_env = "{llm_key_env}"

# Plans search queries and summarizes each fetched page
[models.planner]
model = "{planner_model}"
temperature = {planner_temp}
structured_temperature = {planner_structured}
max_tokens = {planner_tokens}
timeout_secs = {planner_timeout}

# Writes the final cited answer
[models.writer]
model = "{writer_model}"
temperature = {writer_temp}
max_tokens = {writer_tokens}
timeout_secs = {writer_timeout}

[search]
# "duckduckgo" (no key) or "tavily"
provider = "{provider}"
api_key_env = "{search_key_env}"
base_url = "{base_url}"
# Hits researched per query
max_results = {max_results}
# Page content is cut to this many characters before summarizing
max_content_chars = {max_chars}
timeout_secs = {search_timeout}

[pipeline]
min_queries = {min_queries}
max_queries = {max_queries}
# Planning requests made when the planner's JSON does not parse
max_parse_attempts = {parse_attempts}
# Cancel the whole run after this many seconds
# run_timeout_secs = 600

[logging]
# trace, debug, info, warn, error (RUST_LOG takes precedence)
level = "{level}"
# pretty, compact or json
format = "{format}"
# file = "scout.log"
"#,
        endpoint = defaults.llm.endpoint,
        llm_key_env = defaults.llm.api_key_env,
        planner_model = planner.model,
        planner_temp = planner.temperature,
        planner_structured = planner.structured_temperature,
        planner_tokens = planner.max_tokens,
        planner_timeout = planner.timeout_secs,
        writer_model = writer.model,
        writer_temp = writer.temperature,
        writer_tokens = writer.max_tokens,
        writer_timeout = writer.timeout_secs,
        provider = provider,
        search_key_env = defaults.search.api_key_env,
        base_url = defaults.search.base_url,
        max_results = defaults.search.max_results,
        max_chars = defaults.search.max_content_chars,
        search_timeout = defaults.search.timeout_secs,
        min_queries = defaults.pipeline.min_queries,
        max_queries = defaults.pipeline.max_queries,
        parse_attempts = defaults.pipeline.max_parse_attempts,
        level = defaults.logging.level,
        format = defaults.logging.format,
    )
}

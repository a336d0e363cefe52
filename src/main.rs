//! Scout CLI Entry Point
//!
//! - `scout ask [QUESTION]` - Research a question and print the cited answer
//! - `scout init [PATH]` - Write a commented scout.toml
//! - `scout config` - Show or validate the configuration

use anyhow::Context;
use owo_colors::OwoColorize;
use scout::cli::init::{self, InitConfig, InitResult};
use scout::cli::output::Output;
use scout::cli::{Cli, Commands};
use scout::utils::logging::init_tracing;
use scout::utils::toml_config::{ScoutConfig, DEFAULT_CONFIG_FILE};
use scout::ResearchCoordinator;
use std::path::Path;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Commands::Init {
            path,
            force,
            search_provider,
        } => {
            let result = init::run(
                InitConfig {
                    path,
                    force,
                    search_provider,
                },
                &output,
            );
            match result {
                InitResult::Success(_) => Ok(()),
                InitResult::AlreadyExists(path) => {
                    anyhow::bail!("{} already exists (use --force)", path.display())
                }
                InitResult::Error(e) => anyhow::bail!(e),
            }
        }
        Commands::Ask { question, json } => {
            let config = load_config(cli.config.as_deref())?;
            let _log_guard = init_tracing(&config.logging, cli.verbose)
                .context("Failed to initialize logging")?;
            ask(&config, &question, json, &output).await
        }
        Commands::Config { full, validate } => {
            let config = load_config(cli.config.as_deref())?;
            show_config(&config, cli.config.is_some(), full, validate, &output)
        }
    }
}

/// An explicit `--config` must exist; the default scout.toml is optional
fn load_config(path: Option<&Path>) -> anyhow::Result<ScoutConfig> {
    match path {
        Some(path) => ScoutConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => ScoutConfig::load_or_default(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE)),
    }
}

async fn ask(config: &ScoutConfig, question: &str, json: bool, output: &Output) -> anyhow::Result<()> {
    let coordinator = ResearchCoordinator::from_config(config)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling run");
            on_interrupt.cancel();
        }
    });

    let answer = coordinator.run_with_cancellation(question, cancel).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        output.answer(&answer);
    }
    Ok(())
}

fn show_config(
    config: &ScoutConfig,
    explicit_file: bool,
    full: bool,
    validate: bool,
    output: &Output,
) -> anyhow::Result<()> {
    if validate {
        // Loading already validated; reaching here means the file is good
        output.success("Configuration is valid");
        return Ok(());
    }

    if full {
        println!("{}", toml::to_string_pretty(config)?);
        return Ok(());
    }

    output.header("Configuration");
    if !explicit_file && !Path::new(DEFAULT_CONFIG_FILE).exists() {
        output.info(&format!("No {} found, using defaults", DEFAULT_CONFIG_FILE));
    }
    output.kv("endpoint", &config.llm.endpoint);
    output.kv("planner", &config.models.planner.model);
    output.kv("writer", &config.models.writer.model);
    output.kv("search", &config.search.provider.to_string());
    output.kv(
        "queries",
        &format!(
            "{}-{}",
            config.pipeline.min_queries, config.pipeline.max_queries
        ),
    );
    output.kv("content cap", &format!("{} chars", config.search.max_content_chars));
    if let Some(timeout) = config.pipeline.run_timeout_secs {
        output.kv("run timeout", &format!("{}s", timeout));
    }
    output.hint("Use --full to print every setting");
    Ok(())
}

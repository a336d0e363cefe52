//! CLI module for Scout
//!
//! Provides command-line interface parsing for the scout binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use crate::utils::toml_config::SearchProviderKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Question used by `scout ask` when none is given
pub const DEFAULT_QUESTION: &str = "How is the process of building a LLM?";

/// Scout - parallel web research with cited answers
#[derive(Parser, Debug)]
#[command(
    name = "scout",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "Scout - parallel web research with cited answers",
    long_about = "Plans a handful of web search queries for a question, researches them\n\
                  concurrently, and writes one answer citing every source it used.",
    after_help = "EXAMPLES:\n    \
                  scout init                         # Write a commented scout.toml\n    \
                  scout ask \"What is RLHF?\"          # Research a question\n    \
                  scout ask --json \"What is RLHF?\"   # Print the full result as JSON\n    \
                  scout config --validate            # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file [default: scout.toml, optional]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a question and print a cited answer
    Ask {
        /// The question to answer
        #[arg(default_value = DEFAULT_QUESTION)]
        question: String,

        /// Print the full result (queries, sources, timing) as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a commented scout.toml with default settings
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing scout.toml
        #[arg(short, long)]
        force: bool,

        /// Search provider to configure (duckduckgo or tavily)
        #[arg(long, default_value = "duckduckgo", value_parser = parse_search_provider)]
        search_provider: SearchProviderKind,
    },

    /// Show configuration information
    Config {
        /// Show the full configuration as TOML
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

fn parse_search_provider(value: &str) -> Result<SearchProviderKind, String> {
    SearchProviderKind::parse(value)
        .ok_or_else(|| format!("unknown search provider '{}' (expected duckduckgo or tavily)", value))
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the Scout CLI. Status
//! messages go to stderr so stdout carries only the answer (or its JSON).

use crate::types::FinalAnswer;
use owo_colors::OwoColorize;
use std::fmt;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the Scout banner
    pub fn banner(&self) {
        let art = [
            r"  ____                  _   ",
            r" / ___|  ___ ___  _   _| |_ ",
            r" \___ \ / __/ _ \| | | | __|",
            r"  ___) | (_| (_) | |_| | |_ ",
            r" |____/ \___\___/ \__,_|\__|",
        ];

        if self.colored {
            eprintln!();
            for (i, line) in art.iter().enumerate() {
                if i < 2 {
                    eprintln!("   {}", line.bright_cyan().bold());
                } else {
                    eprintln!("   {}", line.blue().bold());
                }
            }
            eprintln!(
                "\n   {} {}\n",
                "Parallel web research".bright_white().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            eprintln!();
            for line in art {
                eprintln!("   {}", line);
            }
            eprintln!("\n   Parallel web research v{}\n", env!("CARGO_PKG_VERSION"));
        }
    }

    /// Write one status line to stderr, styled or plain
    fn status(&self, styled: impl fmt::Display, plain: impl fmt::Display) {
        if self.colored {
            eprintln!("{}", styled);
        } else {
            eprintln!("{}", plain);
        }
    }

    pub fn success(&self, message: &str) {
        self.status(
            format_args!("  {} {}", "✓".green().bold(), message.green()),
            format_args!("  [OK] {}", message),
        );
    }

    pub fn info(&self, message: &str) {
        self.status(
            format_args!("  {} {}", "•".blue(), message),
            format_args!("  [INFO] {}", message),
        );
    }

    pub fn warning(&self, message: &str) {
        self.status(
            format_args!("  {} {}", "⚠".yellow().bold(), message.yellow()),
            format_args!("  [WARN] {}", message),
        );
    }

    pub fn error(&self, message: &str) {
        self.status(
            format_args!("  {} {}", "✗".red().bold(), message.red()),
            format_args!("  [ERROR] {}", message),
        );
    }

    /// Report a file written by `scout init`
    pub fn created(&self, file_type: &str, path: &str) {
        self.status(
            format_args!("  {} {} {}", "✓".green().bold(), file_type.dimmed(), path.bright_white()),
            format_args!("  [CREATED] {} {}", file_type, path),
        );
    }

    pub fn header(&self, title: &str) {
        self.status(
            format_args!("\n  {}", title.bright_white().bold().underline()),
            format_args!("\n  === {} ===", title),
        );
    }

    /// One indented setting, as printed by `scout config`
    pub fn kv(&self, key: &str, value: &str) {
        self.status(
            format_args!("    {}: {}", key.dimmed(), value.bright_white()),
            format_args!("    {}: {}", key, value),
        );
    }

    pub fn hint(&self, message: &str) {
        self.status(
            format_args!("\n  {} {}", "💡".dimmed(), message.dimmed().italic()),
            format_args!("\n  [TIP] {}", message),
        );
    }

    /// A shell command the user can copy
    pub fn command(&self, cmd: &str) {
        self.status(
            format_args!("     {}", format!("$ {}", cmd).bright_cyan()),
            format_args!("     $ {}", cmd),
        );
    }

    /// Print the answer to stdout, followed by a short run summary on stderr
    pub fn answer(&self, answer: &FinalAnswer) {
        println!("{}", answer.answer);

        let summary = format!(
            "{} queries, {} sources, {:.1}s",
            answer.queries.len(),
            answer.sources.len(),
            answer.duration_ms as f64 / 1000.0
        );
        self.status(
            format_args!("\n  {} {}", "✓".green().bold(), summary.dimmed()),
            format_args!("\n  [DONE] {}", summary),
        );
    }
}

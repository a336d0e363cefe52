//! Configuration and process bootstrap utilities.

/// Tracing subscriber setup.
pub mod logging;
/// TOML configuration loading and validation.
pub mod toml_config;

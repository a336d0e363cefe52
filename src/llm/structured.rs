//! Structured output extraction
//!
//! Completion backends are not guaranteed to emit pure JSON even when asked
//! to, so extraction is lenient first and strict second:
//!
//! 1. locate the first balanced `{...}` object in the response and parse it
//! 2. otherwise parse the whole response
//!
//! If neither yields a value of the declared type the call fails with
//! [`AppError::SchemaParse`]. There is no fallback value.

use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Hard instruction appended to every structured prompt
pub const JSON_ONLY_INSTRUCTION: &str =
    "CRITICAL: Respond ONLY with a valid JSON object. No other text before or after.";

/// Number of response characters quoted in parse errors
const ERROR_EXCERPT_CHARS: usize = 200;

/// Append the JSON-only instruction to a prompt.
pub fn with_json_instruction(prompt: &str) -> String {
    format!("{}\n\n{}", prompt, JSON_ONLY_INSTRUCTION)
}

/// Ask `client` for a value of type `T`.
///
/// The JSON schema of `T` is embedded in the prompt, the completion is
/// requested through [`LLMClient::generate_json`] and the response goes
/// through [`extract_json`]. Transport failures propagate unchanged as
/// [`AppError::Upstream`].
pub async fn generate_structured<T>(client: &dyn LLMClient, prompt: &str) -> Result<T>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = schemars::schema_for!(T);
    let schema_json = serde_json::to_string(&schema)
        .map_err(|e| AppError::Internal(format!("Failed to render schema: {}", e)))?;

    let prompt = format!(
        "{}\n\nThe JSON object must conform to this JSON Schema:\n{}",
        prompt, schema_json
    );

    let content = client.generate_json(&prompt).await?;
    extract_json(&content)
}

/// Parse `content` as `T`, tolerating prose around the JSON object.
pub fn extract_json<T: DeserializeOwned>(content: &str) -> Result<T> {
    if let Some(candidate) = first_balanced_object(content) {
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => debug!(error = %e, "Embedded JSON object did not match the schema"),
        }
    }

    match serde_json::from_str::<T>(content.trim()) {
        Ok(value) => Ok(value),
        Err(e) => {
            let excerpt: String = content.chars().take(ERROR_EXCERPT_CHARS).collect();
            warn!(error = %e, response = %excerpt, "Could not parse response as JSON");
            Err(AppError::SchemaParse(format!(
                "response could not be parsed into the expected schema ({}): {}",
                e, excerpt
            )))
        }
    }
}

/// Find the first `{` that opens a balanced object and return that object.
///
/// Braces inside JSON string literals are ignored. Returns `None` when no
/// opening brace is ever closed.
pub fn first_balanced_object(content: &str) -> Option<&str> {
    let mut search_from = 0;

    while let Some(offset) = content[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = matching_brace(&content[start..]) {
            return Some(&content[start..start + end + 1]);
        }
        search_from = start + 1;
    }

    None
}

/// Byte index of the `}` closing the `{` at index 0 of `s`.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

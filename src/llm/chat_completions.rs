//! Chat-completions HTTP client
//!
//! Speaks the OpenAI-shaped `/v1/chat/completions` contract that local
//! inference servers (Foundry Local, llama.cpp server, vLLM, LM Studio) expose:
//! a single user message in, `choices[0].message.content` out.

use crate::llm::client::{LLMClient, ModelProfile};
use crate::llm::structured::with_json_instruction;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Maximum number of response-body characters carried into an error message
const ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionsClient {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
    profile: ModelProfile,
}

impl ChatCompletionsClient {
    /// Create a client for `endpoint` (scheme + host, with or without a trailing slash).
    pub fn new(endpoint: &str, api_key: String, profile: ModelProfile) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(profile.timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: format!("{}{}", endpoint.trim_end_matches('/'), COMPLETIONS_PATH),
            api_key,
            profile,
        })
    }

    pub fn profile(&self) -> &ModelProfile {
        &self.profile
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        debug!(model = %self.profile.model, prompt_chars = prompt.len(), "Invoking model");

        let body = ChatRequest {
            model: &self.profile.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens: self.profile.max_tokens,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .header("Accept", "application/json")
            .header("api-key", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.profile.model, error = %e, "HTTP request failed");
                AppError::Upstream(format!("HTTP request to {} failed: {}", self.api_url, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let excerpt: String = text.chars().take(ERROR_BODY_CHARS).collect();
            error!(model = %self.profile.model, %status, body = %excerpt, "Completion request rejected");
            return Err(AppError::Upstream(format!(
                "Model '{}' request failed ({}): {}",
                self.profile.model, status, excerpt
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse completion response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::Upstream(format!(
                    "No choices in response from model '{}'",
                    self.profile.model
                ))
            })?;

        debug!(model = %self.profile.model, response_chars = content.len(), "Model responded");
        Ok(content)
    }
}

#[async_trait]
impl LLMClient for ChatCompletionsClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt, self.profile.temperature).await
    }

    async fn generate_json(&self, prompt: &str) -> Result<String> {
        let prompt = with_json_instruction(prompt);
        self.complete(&prompt, self.profile.structured_temperature)
            .await
    }

    fn model_name(&self) -> &str {
        &self.profile.model
    }
}

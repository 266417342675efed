//! Generation provider for the OpenAI `/chat/completions` endpoint.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

use super::{OPENAI_API_BASE, api_key_from_env, endpoint};
use crate::completion::{ChatCompletion, ChatMessage, api_error_message};
use crate::error::{RagError, Result};
use crate::generation::{GenerationProvider, GenerationRequest};

/// The default chat model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const PROVIDER: &str = "OpenAI";

/// A [`GenerationProvider`] backed by an OpenAI-compatible chat API.
///
/// The rendered prompt is sent as a single user message, with
/// `max_tokens` taken from the request.
pub struct OpenAIGenerationProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAIGenerationProvider {
    /// Create a new provider with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Config(format!("{PROVIDER}: API key must not be empty")));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENAI_API_BASE.into(),
            model: DEFAULT_MODEL.into(),
            temperature: 0.0,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(api_key_from_env(PROVIDER)?)
    }

    /// Point the provider at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the chat model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature (default 0.0).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[async_trait]
impl GenerationProvider for OpenAIGenerationProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        debug!(
            provider = PROVIDER,
            model = %self.model,
            prompt_len = request.prompt.len(),
            max_tokens = request.max_new_tokens,
            "requesting chat completion"
        );

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::user(request.prompt.clone())],
            max_tokens: request.max_new_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::generation(PROVIDER, format!("request failed: {e}"))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to read response body");
            RagError::generation(PROVIDER, format!("failed to read response: {e}"))
        })?;

        if !status.is_success() {
            let detail = api_error_message(&text).unwrap_or(text);
            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::generation(PROVIDER, format!("API returned {status}: {detail}")));
        }

        let completion = ChatCompletion::from_json(&text)?;
        if let Some(usage) = completion.usage {
            debug!(
                provider = PROVIDER,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }
        Ok(completion.answer_text()?.trim().to_string())
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

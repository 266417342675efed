//! Embedding provider for the OpenAI `/embeddings` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{OPENAI_API_BASE, api_key_from_env, endpoint};
use crate::completion::api_error_message;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The default model for OpenAI embeddings.
const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

const PROVIDER: &str = "OpenAI";

/// An [`EmbeddingProvider`] backed by an OpenAI-compatible embeddings API.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-small`.
/// - `dimensions` – optional Matryoshka dimension override.
/// - `base_url` – defaults to the public OpenAI API.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment variable.
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key.
    ///
    /// Uses the default model (`text-embedding-3-small`) and dimensions (1536).
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
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
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

    /// Set the model name (e.g. `text-embedding-3-large`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the output dimensions (Matryoshka support).
    ///
    /// When set, the API returns embeddings truncated to this size.
    /// This also updates the value returned by [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }

    /// Declare the width the model returns without sending `dimensions`.
    ///
    /// Use this for models whose native width is not 1536 on servers that
    /// reject the `dimensions` request field.
    pub fn with_expected_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = None;
        self
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Order rows by their `index` and check one row per input.
fn into_ordered_embeddings(
    mut data: Vec<EmbeddingData>,
    expected: usize,
) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(RagError::encoding(
            PROVIDER,
            format!("expected {expected} embeddings, got {}", data.len()),
        ));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| RagError::encoding(PROVIDER, "API returned empty response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "embeddings"))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::encoding(PROVIDER, format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = api_error_message(&body).unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::encoding(PROVIDER, format!("API returned {status}: {detail}")));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::encoding(PROVIDER, format!("failed to parse response: {e}"))
        })?;

        into_ordered_embeddings(embedding_response.data, texts.len())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

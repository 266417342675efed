//! Answer generation from a query and retrieved context.
//!
//! [`Generator`] owns the prompt side: it bounds the context to the model's
//! input window, renders a deterministic prompt, and hands a
//! [`GenerationRequest`] to a [`GenerationProvider`], the model boundary.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::document::Document;
use crate::error::Result;

/// Separator placed between context documents in the prompt.
pub const CONTEXT_SEPARATOR: &str = " ";

/// Context line used when retrieval returned nothing.
pub const EMPTY_CONTEXT: &str = "No relevant news articles were found.";

/// Answer returned by [`ExtractiveGenerationProvider`] for an empty context.
pub const NO_ANSWER: &str = "I don't know based on the available news.";

/// Everything a model backend needs to produce one answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    /// The fully rendered prompt.
    pub prompt: String,
    /// The user question the prompt was built from.
    pub query: String,
    /// The bounded context, nearest document first.
    pub context: Vec<Document>,
    /// Upper bound on generated tokens.
    pub max_new_tokens: usize,
}

/// A text-generation backend.
///
/// # Example
///
/// ```rust,ignore
/// use newsrag::{GenerationProvider, GenerationRequest};
///
/// let answer = provider.generate(&request).await?;
/// ```
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Produce a single answer string for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// A short provider name used in logs and error messages.
    fn name(&self) -> &str {
        "generation"
    }
}

/// Builds prompts and invokes a [`GenerationProvider`].
#[derive(Clone)]
pub struct Generator {
    provider: Arc<dyn GenerationProvider>,
    max_new_tokens: usize,
    max_context_chars: usize,
}

impl Generator {
    /// Create a generator with the given output and context bounds.
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        max_new_tokens: usize,
        max_context_chars: usize,
    ) -> Self {
        Self { provider, max_new_tokens, max_context_chars }
    }

    /// Bound the context, render the prompt, and generate an answer.
    ///
    /// # Errors
    ///
    /// Propagates [`RagError::Generation`](crate::RagError::Generation) from
    /// the provider unchanged.
    pub async fn generate(&self, query: &str, context: &[Document]) -> Result<String> {
        let context = bound_context(context, self.max_context_chars);
        let request = GenerationRequest {
            prompt: build_prompt(query, &context),
            query: query.to_string(),
            context,
            max_new_tokens: self.max_new_tokens,
        };

        debug!(
            provider = self.provider.name(),
            prompt_len = request.prompt.len(),
            context_docs = request.context.len(),
            "generating answer"
        );

        self.provider.generate(&request).await.inspect_err(|e| {
            error!(provider = self.provider.name(), error = %e, "generation failed");
        })
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("provider", &self.provider.name())
            .field("max_new_tokens", &self.max_new_tokens)
            .field("max_context_chars", &self.max_context_chars)
            .finish()
    }
}

/// Render the prompt: context documents joined by [`CONTEXT_SEPARATOR`], then the question.
pub fn build_prompt(query: &str, context: &[Document]) -> String {
    let joined = if context.is_empty() {
        EMPTY_CONTEXT.to_string()
    } else {
        context.iter().map(|d| d.text.as_str()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
    };
    format!("Context: {joined}\n\nQuestion: {query}\nAnswer:")
}

/// Keep the longest nearest-first prefix of `context` that fits in `max_chars`.
///
/// The first document that does not fit is dropped along with everything
/// after it. A nearest document that alone exceeds the budget is cut at a
/// char boundary instead, so retrieved context never vanishes entirely.
pub fn bound_context(context: &[Document], max_chars: usize) -> Vec<Document> {
    let separator_len = CONTEXT_SEPARATOR.chars().count();
    let mut kept: Vec<Document> = Vec::with_capacity(context.len());
    let mut used = 0;
    let mut truncated = false;

    for document in context {
        let separator = if kept.is_empty() { 0 } else { separator_len };
        let len = document.text.chars().count();
        if used + separator + len <= max_chars {
            used += separator + len;
            kept.push(document.clone());
            continue;
        }
        if kept.is_empty() {
            let text: String = document.text.chars().take(max_chars).collect();
            kept.push(Document { index: document.index, text });
        }
        truncated = true;
        break;
    }

    if truncated {
        warn!(
            retrieved = context.len(),
            kept = kept.len(),
            max_chars,
            "context truncated to fit the model input window"
        );
    }
    kept
}

/// Offline backend that answers with the nearest retrieved document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveGenerationProvider;

#[async_trait]
impl GenerationProvider for ExtractiveGenerationProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        Ok(request
            .context
            .first()
            .map(|d| d.text.clone())
            .unwrap_or_else(|| NO_ANSWER.to_string()))
    }

    fn name(&self) -> &str {
        "extractive"
    }
}

//! OpenAI-compatible HTTP backends.
//!
//! This module is only available when the `openai` feature is enabled. Both
//! providers accept a custom base URL, so any server that speaks the OpenAI
//! `/embeddings` and `/chat/completions` endpoints (Ollama, vLLM, ...) works.
//!
//! # Example
//!
//! ```rust,ignore
//! use newsrag::openai::{OpenAIEmbeddingProvider, OpenAIGenerationProvider};
//!
//! let embedder = OpenAIEmbeddingProvider::from_env()?;
//! let generator = OpenAIGenerationProvider::from_env()?.with_model("gpt-4o-mini");
//! ```

mod embedding;
mod generation;

pub use embedding::OpenAIEmbeddingProvider;
pub use generation::OpenAIGenerationProvider;

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

pub(crate) fn api_key_from_env(provider: &str) -> crate::Result<String> {
    std::env::var("OPENAI_API_KEY").map_err(|_| {
        crate::RagError::Config(format!("{provider}: OPENAI_API_KEY environment variable not set"))
    })
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

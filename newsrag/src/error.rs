//! Error types for the `newsrag` crate.

use thiserror::Error;

/// Errors that can occur while loading, indexing, retrieving, or generating.
#[derive(Debug, Error)]
pub enum RagError {
    /// The corpus source was missing, unreadable, or not valid UTF-8.
    #[error("Corpus load error ({path}): {message}")]
    CorpusLoad {
        /// The path that failed to load.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Encoding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The similarity index rejected a query (dimension mismatch, invalid `top_k`).
    #[error("Search error: {0}")]
    Search(String),

    /// An error occurred while invoking the generation model.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RagError {
    pub(crate) fn encoding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encoding { provider: provider.into(), message: message.into() }
    }

    pub(crate) fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation { provider: provider.into(), message: message.into() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;

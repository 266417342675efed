//! Configuration for the RAG pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::index::DistanceMetric;

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Number of documents retrieved by [`answer`](crate::RagPipeline::answer).
    pub top_k: usize,
    /// Upper bound on generated tokens per answer.
    pub max_new_tokens: usize,
    /// Upper bound on the characters of retrieved context placed in the prompt.
    pub max_context_chars: usize,
    /// Number of corpus documents sent to the embedding provider per call.
    pub embedding_batch_size: usize,
    /// Distance function used by the similarity index.
    pub metric: DistanceMetric,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_new_tokens: 64,
            max_context_chars: 2000,
            embedding_batch_size: 32,
            metric: DistanceMetric::SquaredEuclidean,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the default number of documents to retrieve.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the maximum number of generated tokens.
    pub fn max_new_tokens(mut self, tokens: usize) -> Self {
        self.config.max_new_tokens = tokens;
        self
    }

    /// Set the maximum context length in characters.
    pub fn max_context_chars(mut self, chars: usize) -> Self {
        self.config.max_context_chars = chars;
        self
    }

    /// Set how many documents are embedded per provider call.
    pub fn embedding_batch_size(mut self, size: usize) -> Self {
        self.config.embedding_batch_size = size;
        self
    }

    /// Set the index distance metric.
    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.config.metric = metric;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `top_k`, `max_new_tokens`,
    /// `max_context_chars`, or `embedding_batch_size` is zero.
    pub fn build(self) -> Result<RagConfig> {
        let checks = [
            ("top_k", self.config.top_k),
            ("max_new_tokens", self.config.max_new_tokens),
            ("max_context_chars", self.config.max_context_chars),
            ("embedding_batch_size", self.config.embedding_batch_size),
        ];
        if let Some((field, _)) = checks.iter().find(|(_, value)| *value == 0) {
            return Err(RagError::Config(format!("{field} must be greater than zero")));
        }
        Ok(self.config)
    }
}

//! RAG pipeline facade.
//!
//! The [`RagPipeline`] composes a [`Retriever`] and a [`Generator`] behind a
//! single [`answer`](RagPipeline::answer) call. It is created by
//! [`RagPipelineBuilder::build`], which embeds the whole corpus once and
//! builds the similarity index; a built pipeline is immutable and can be
//! shared across tasks behind an `Arc`.
//!
//! # Example
//!
//! ```rust,ignore
//! use newsrag::{
//!     ExtractiveGenerationProvider, HashingEmbeddingProvider, RagConfig, RagPipeline,
//! };
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
//!     .generation_provider(Arc::new(ExtractiveGenerationProvider))
//!     .build(corpus)
//!     .await?;
//!
//! let answer = pipeline.answer("What happened at the Olympics?").await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::config::RagConfig;
use crate::document::{Document, RetrievedDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{GenerationProvider, Generator};
use crate::index::FlatIndex;
use crate::retriever::Retriever;

/// The ready-to-query RAG pipeline.
///
/// Query execution is embed → search → generate. Construct one via
/// [`RagPipeline::builder()`].
#[derive(Debug)]
pub struct RagPipeline {
    config: RagConfig,
    retriever: Retriever,
    generator: Generator,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The indexed corpus, in load order.
    pub fn corpus(&self) -> &[Document] {
        self.retriever.corpus()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.corpus().len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.corpus().is_empty()
    }

    /// Return up to `top_k` corpus documents nearest to `query`, nearest first.
    ///
    /// A `top_k` of zero returns nothing; a `top_k` larger than the corpus
    /// returns the whole corpus.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Encoding`] if the query cannot be embedded.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>> {
        self.retriever.retrieve(query, top_k).await
    }

    /// Like [`retrieve`](Self::retrieve), keeping each document's distance.
    pub async fn retrieve_scored(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        self.retriever.retrieve_scored(query, top_k).await
    }

    /// Generate an answer to `query` grounded on `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Generation`] if the model call fails.
    pub async fn generate(&self, query: &str, context: &[Document]) -> Result<String> {
        self.generator.generate(query, context).await
    }

    /// Retrieve with the configured `top_k`, then generate.
    ///
    /// An empty corpus yields an empty context; the generator is still
    /// called so it can say it lacks information.
    ///
    /// # Errors
    ///
    /// Propagates [`RagError::Encoding`] and [`RagError::Generation`] unchanged.
    pub async fn answer(&self, query: &str) -> Result<String> {
        let context = self.retrieve(query, self.config.top_k).await?;
        let answer = self.generate(query, &context).await?;
        info!(context_docs = context.len(), answer_len = answer.len(), "answered query");
        Ok(answer)
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// Both providers are required; the config falls back to
/// [`RagConfig::default`]. Call [`build()`](RagPipelineBuilder::build)
/// with the corpus to embed it and produce the pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::builder().top_k(5).build()?)
///     .embedding_provider(Arc::new(embedder))
///     .generation_provider(Arc::new(generator))
///     .build(corpus)
///     .await?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the generation provider.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Embed `corpus`, build the similarity index, and return the pipeline.
    ///
    /// Building twice from the same corpus yields pipelines with identical
    /// retrieval results.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a provider is missing and
    /// [`RagError::Encoding`] if embedding fails or returns vectors of the
    /// wrong count or dimensionality.
    pub async fn build(self, corpus: Vec<Document>) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let generation_provider = self
            .generation_provider
            .ok_or_else(|| RagError::Config("generation_provider is required".to_string()))?;

        let vectors =
            embed_corpus(embedding_provider.as_ref(), &corpus, config.embedding_batch_size)
                .await?;
        let index = FlatIndex::build(vectors, config.metric)?;

        info!(
            document_count = corpus.len(),
            dimensions = embedding_provider.dimensions(),
            provider = embedding_provider.name(),
            "built pipeline index"
        );

        let retriever = Retriever::new(corpus, embedding_provider, Arc::new(index))?;
        let generator =
            Generator::new(generation_provider, config.max_new_tokens, config.max_context_chars);

        Ok(RagPipeline { config, retriever, generator })
    }
}

/// Embed every document in batches, checking count and dimensionality.
async fn embed_corpus(
    provider: &dyn EmbeddingProvider,
    corpus: &[Document],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    let dimensions = provider.dimensions();
    let mut vectors = Vec::with_capacity(corpus.len());

    for batch in corpus.chunks(batch_size.max(1)) {
        let texts: Vec<&str> = batch.iter().map(|d| d.text.as_str()).collect();
        let embeddings = provider.embed_batch(&texts).await.inspect_err(|e| {
            error!(provider = provider.name(), error = %e, "embedding failed during index build");
        })?;

        if embeddings.len() != texts.len() {
            return Err(RagError::encoding(
                provider.name(),
                format!("expected {} embeddings, got {}", texts.len(), embeddings.len()),
            ));
        }
        if let Some((offset, bad)) =
            embeddings.iter().enumerate().find(|(_, v)| v.len() != dimensions)
        {
            let index = batch[offset].index;
            return Err(RagError::encoding(
                provider.name(),
                format!(
                    "document {index} embedded to {} dimensions, expected {dimensions}",
                    bad.len()
                ),
            ));
        }

        vectors.extend(embeddings);
    }

    Ok(vectors)
}

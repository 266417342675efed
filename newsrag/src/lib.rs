//! # newsrag
//!
//! Retrieval-Augmented Generation over a line-per-article news corpus.
//!
//! ## Overview
//!
//! The corpus is loaded once, embedded once, and indexed in memory. Each
//! question is embedded, matched against the index, and answered by a
//! generation model conditioned on the nearest articles.
//!
//! - [`load_corpus`] - read a UTF-8 file, one [`Document`] per non-empty line
//! - [`EmbeddingProvider`] - text → vector ([`HashingEmbeddingProvider`] offline,
//!   `openai::OpenAIEmbeddingProvider` with the `openai` feature)
//! - [`FlatIndex`] - exact nearest-neighbour search
//! - [`Retriever`] - query → nearest documents
//! - [`Generator`] / [`GenerationProvider`] - prompt building and model calls
//! - [`RagPipeline`] - `retrieve`, `generate`, and `answer` behind one handle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use newsrag::{
//!     ExtractiveGenerationProvider, HashingEmbeddingProvider, RagPipeline, load_corpus,
//! };
//!
//! let corpus = load_corpus("data/news_sample.txt")?;
//! let pipeline = RagPipeline::builder()
//!     .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
//!     .generation_provider(Arc::new(ExtractiveGenerationProvider))
//!     .build(corpus)
//!     .await?;
//!
//! println!("{}", pipeline.answer("Who won a medal?").await?);
//! ```
//!
//! ## Features
//!
//! - `openai` - OpenAI-compatible embedding and chat-completion backends

pub mod completion;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod hashing;
pub mod index;
pub mod loader;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod retriever;
pub mod serialized;

pub use completion::{ChatCompletion, ChatMessage, Choice, Usage};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Document, Neighbor, RetrievedDocument};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::{
    ExtractiveGenerationProvider, GenerationProvider, GenerationRequest, Generator,
};
pub use hashing::HashingEmbeddingProvider;
pub use index::{DistanceMetric, FlatIndex, VectorIndex};
pub use loader::{load_corpus, parse_corpus};
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use retriever::{DEFAULT_TOP_K, Retriever, parse_top_k};
pub use serialized::Serialized;

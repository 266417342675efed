//! Query-time retrieval: encode → search → map positions back to documents.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::{Document, RetrievedDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// Default number of documents retrieved per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Finds the corpus documents nearest to a query.
///
/// The index must have been built from the corpus embeddings in corpus
/// order, so that index position `i` is `corpus[i]`.
pub struct Retriever {
    corpus: Vec<Document>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    /// Pair a corpus with the index built from its embeddings.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Search`] if the index and corpus sizes differ.
    pub fn new(
        corpus: Vec<Document>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Result<Self> {
        if corpus.len() != index.len() {
            return Err(RagError::Search(format!(
                "index holds {} vectors but the corpus has {} documents",
                index.len(),
                corpus.len()
            )));
        }
        Ok(Self { corpus, embedding_provider, index })
    }

    /// The documents this retriever searches, in corpus order.
    pub fn corpus(&self) -> &[Document] {
        &self.corpus
    }

    /// Return up to `top_k` documents, nearest first.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Encoding`] if the query cannot be embedded and
    /// [`RagError::Search`] if its dimensionality does not match the index.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>> {
        let scored = self.retrieve_scored(query, top_k).await?;
        Ok(scored.into_iter().map(|r| r.document).collect())
    }

    /// Like [`retrieve`](Self::retrieve), keeping each document's distance.
    ///
    /// A query that embeds to the zero vector matches nothing.
    pub async fn retrieve_scored(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        if top_k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedding_provider.embed(query).await.inspect_err(|e| {
            error!(provider = self.embedding_provider.name(), error = %e, "query embedding failed");
        })?;

        if query_embedding.iter().all(|x| *x == 0.0) {
            debug!("query has no content to match, returning no documents");
            return Ok(Vec::new());
        }

        let neighbors = self.index.search(&query_embedding, top_k).inspect_err(|e| {
            error!(error = %e, "index search failed");
        })?;

        let results: Vec<RetrievedDocument> = neighbors
            .into_iter()
            .filter_map(|n| {
                let document = self.corpus.get(n.position)?.clone();
                Some(RetrievedDocument { document, distance: n.distance })
            })
            .collect();

        debug!(top_k, result_count = results.len(), "retrieval completed");
        Ok(results)
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("corpus_len", &self.corpus.len())
            .field("embedding_provider", &self.embedding_provider.name())
            .field("index_dimensions", &self.index.dimensions())
            .finish()
    }
}

/// Parse a user-supplied `top_k`, rejecting zero, negatives, and non-numbers.
///
/// # Errors
///
/// Returns [`RagError::Search`] for anything that is not a positive integer.
pub fn parse_top_k(raw: &str) -> Result<usize> {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(k) if k > 0 => usize::try_from(k)
            .map_err(|_| RagError::Search(format!("top_k {k} is out of range"))),
        Ok(k) => Err(RagError::Search(format!("top_k must be positive, got {k}"))),
        Err(_) => Err(RagError::Search(format!("top_k must be a positive integer, got '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashingEmbeddingProvider;
    use crate::index::{DistanceMetric, FlatIndex};

    fn hashing_retriever(texts: &[&str]) -> Retriever {
        let provider = HashingEmbeddingProvider::new(64);
        let vectors = texts.iter().map(|t| provider.embed_text(t)).collect();
        let index = FlatIndex::build(vectors, DistanceMetric::default()).unwrap();
        Retriever::new(Document::corpus(texts.iter().copied()), Arc::new(provider), Arc::new(index))
            .unwrap()
    }

    #[tokio::test]
    async fn stop_word_only_query_matches_nothing() {
        let retriever = hashing_retriever(&[
            "The Olympics were held in Tokyo.",
            "An infrastructure bill was passed in Congress.",
        ]);
        assert!(retriever.retrieve("what is it?", 3).await.unwrap().is_empty());
        assert_eq!(retriever.retrieve("Tokyo", 3).await.unwrap().len(), 2);
    }

    #[test]
    fn mismatched_index_is_rejected() {
        let provider = HashingEmbeddingProvider::new(8);
        let index = FlatIndex::build(Vec::new(), DistanceMetric::default()).unwrap();
        let err = Retriever::new(Document::corpus(["orphan"]), Arc::new(provider), Arc::new(index))
            .unwrap_err();
        assert!(matches!(err, RagError::Search(_)));
    }

    #[test]
    fn parses_positive_top_k() {
        assert_eq!(parse_top_k(" 5 ").unwrap(), 5);
    }

    #[test]
    fn rejects_non_positive_top_k() {
        assert!(matches!(parse_top_k("0"), Err(RagError::Search(_))));
        assert!(matches!(parse_top_k("-3"), Err(RagError::Search(_))));
        assert!(matches!(parse_top_k("three"), Err(RagError::Search(_))));
    }
}

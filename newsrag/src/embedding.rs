//! The text-to-vector model boundary.

use async_trait::async_trait;

use crate::error::Result;

/// Turns text into fixed-width vectors for the similarity index.
///
/// The corpus is embedded through [`embed_batch`](EmbeddingProvider::embed_batch)
/// when the pipeline is built, and each query through
/// [`embed`](EmbeddingProvider::embed). Both paths must agree: a text gets
/// the same vector whether it is embedded alone or as any member of any
/// batch, and every vector has exactly [`dimensions`](EmbeddingProvider::dimensions)
/// entries. The pipeline checks the width at build time and rejects
/// providers that break it.
///
/// # Example
///
/// ```rust,ignore
/// use newsrag::{EmbeddingProvider, HashingEmbeddingProvider};
///
/// let provider = HashingEmbeddingProvider::new(384);
/// let vector = provider.embed("Parliament passed the budget").await?;
/// assert_eq!(vector.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, returning one vector per input in input order.
    ///
    /// Row `i` must equal `embed(texts[i])`. The provided implementation
    /// satisfies that by calling `embed` once per text; backends with a
    /// native batch endpoint override it and must keep the same contract.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Width of every vector this provider returns.
    fn dimensions(&self) -> usize;

    /// Short name used in logs and error messages.
    fn name(&self) -> &str {
        "embedding"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::RagError;

    /// Encodes a text as `[byte length, call number]`.
    #[derive(Default)]
    struct LengthEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.is_empty() {
                return Err(RagError::encoding("length", "empty input"));
            }
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, call as f32])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn default_batch_keeps_input_order() {
        let provider = LengthEmbedder::default();
        let vectors = provider.embed_batch(&["a", "abc", "ab"]).await.unwrap();
        assert_eq!(vectors, [vec![1.0, 0.0], vec![3.0, 1.0], vec![2.0, 2.0]]);
        assert_eq!(provider.name(), "embedding");
    }

    #[tokio::test]
    async fn default_batch_stops_at_first_failure() {
        let provider = LengthEmbedder::default();
        let err = provider.embed_batch(&["ok", "", "never"]).await.unwrap_err();
        assert!(matches!(err, RagError::Encoding { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls() {
        let provider = LengthEmbedder::default();
        assert!(provider.embed_batch(&[]).await.unwrap().is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}

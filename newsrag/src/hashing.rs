//! Offline embedding provider based on feature hashing.
//!
//! [`HashingEmbeddingProvider`] turns text into a bag of lower-cased content
//! words and hashes each word into one of `dimensions` buckets. It needs no
//! model weights or network access, which makes it the default backend for
//! local runs and the reference encoder in tests. Texts that share words end
//! up close together; texts with disjoint vocabularies are orthogonal.

use async_trait::async_trait;
use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;

/// Default dimensionality, matching common small sentence-embedding models.
pub const DEFAULT_DIMENSIONS: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has",
    "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "me", "my",
    "of", "on", "or", "our", "she", "so", "than", "that", "the", "their", "them", "then",
    "there", "these", "they", "this", "to", "was", "we", "were", "what", "when", "where",
    "which", "who", "why", "will", "with", "would", "you", "your",
];

/// A deterministic, batch-invariant [`EmbeddingProvider`] using the hashing trick.
///
/// Every output vector is L2-normalised, except for texts without any
/// content words, which map to the zero vector.
///
/// # Example
///
/// ```rust,ignore
/// use newsrag::HashingEmbeddingProvider;
///
/// let provider = HashingEmbeddingProvider::default();
/// let a = provider.embed("Tokyo hosted the Olympics").await?;
/// ```
#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    /// Create a provider producing vectors of the given size (at least 1).
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }

    /// Compute the embedding synchronously.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        embedding
    }
}

impl Default for HashingEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

/// Lower-cased alphanumeric words with stop words removed.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME))
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "hashing", text_len = text.len(), "embedding single text");
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        debug!(provider = "hashing", batch_size = texts.len(), "embedding batch");
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

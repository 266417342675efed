//! Serialised access to model backends that are not reentrant.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::generation::{GenerationProvider, GenerationRequest};

/// Wraps a provider so that at most one call runs at a time.
///
/// The pipeline itself is safe to share; wrap a backend in `Serialized`
/// only when the backend cannot handle overlapping calls.
///
/// # Example
///
/// ```rust,ignore
/// use newsrag::Serialized;
///
/// let provider = Arc::new(Serialized::new(LocalModel::load()?));
/// ```
#[derive(Debug, Default)]
pub struct Serialized<T> {
    inner: T,
    gate: Mutex<()>,
}

impl<T> Serialized<T> {
    /// Wrap `inner`.
    pub fn new(inner: T) -> Self {
        Self { inner, gate: Mutex::new(()) }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: EmbeddingProvider> EmbeddingProvider for Serialized<T> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let _guard = self.gate.lock().await;
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let _guard = self.gate.lock().await;
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[async_trait]
impl<T: GenerationProvider> GenerationProvider for Serialized<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let _guard = self.gate.lock().await;
        self.inner.generate(request).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::hashing::HashingEmbeddingProvider;

    /// Records the highest number of overlapping calls it has seen.
    #[derive(Default)]
    struct OverlapProbe {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl GenerationProvider for OverlapProbe {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok("done".to_string())
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "p".into(),
            query: "q".into(),
            context: Vec::new(),
            max_new_tokens: 8,
        }
    }

    #[tokio::test]
    async fn delegates_embedding_calls() {
        let plain = HashingEmbeddingProvider::new(32);
        let wrapped = Serialized::new(plain.clone());
        assert_eq!(wrapped.dimensions(), 32);
        assert_eq!(wrapped.name(), "hashing");
        assert_eq!(wrapped.embed("rain in Oslo").await.unwrap(), plain.embed_text("rain in Oslo"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn calls_never_overlap() {
        let provider = Arc::new(Serialized::new(OverlapProbe::default()));
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let provider = Arc::clone(&provider);
                tokio::spawn(async move { provider.generate(&request()).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "done");
        }
        assert_eq!(provider.inner().peak.load(Ordering::SeqCst), 1);
    }
}

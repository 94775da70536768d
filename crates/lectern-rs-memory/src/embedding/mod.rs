//! Embedding providers and the infallible engine-facing embedder.

mod hash;
mod openai;

pub use hash::HashEmbeddingProvider;
pub use openai::OpenAiEmbeddingProvider;

use crate::error::MemoryError;
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

/// Default embedding dimension.
pub const DEFAULT_DIMENSIONS: usize = 384;

#[async_trait]
/// Turns text into a fixed-length vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError>;

    /// Embed several texts; providers with a batch endpoint override this.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Model identifier reported in diagnostics.
    fn model_name(&self) -> &str;

    /// Length of produced vectors.
    fn dimensions(&self) -> usize;
}

/// Embedding backend selection.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingBackend {
    /// Deterministic, non-semantic hash transform only.
    Hash,
    /// OpenAI-compatible `/embeddings` endpoint with hash fallback.
    OpenAi {
        base_url: String,
        model: String,
        api_key: String,
    },
}

/// Embedder used by the engine components.
///
/// `embed` never fails: a primary provider error, or a vector of the wrong
/// length, resolves through the hash fallback.
#[derive(Clone)]
pub struct Embedder {
    primary: Option<Arc<dyn EmbeddingProvider>>,
    fallback: HashEmbeddingProvider,
}

impl Embedder {
    /// Embedder backed only by the hash transform.
    pub fn hash(dimensions: usize) -> Self {
        Self {
            primary: None,
            fallback: HashEmbeddingProvider::new(dimensions),
        }
    }

    /// Embedder with a primary provider and hash fallback of the same dimension.
    pub fn with_provider(provider: Arc<dyn EmbeddingProvider>, dimensions: usize) -> Self {
        Self {
            primary: Some(provider),
            fallback: HashEmbeddingProvider::new(dimensions),
        }
    }

    /// Build an embedder for the configured backend.
    pub fn from_backend(backend: &EmbeddingBackend, dimensions: usize) -> Self {
        match backend {
            EmbeddingBackend::Hash => Self::hash(dimensions),
            EmbeddingBackend::OpenAi {
                base_url,
                model,
                api_key,
            } => {
                let provider = OpenAiEmbeddingProvider::new(api_key.clone())
                    .with_base_url(base_url.clone())
                    .with_model(model.clone(), dimensions);
                Self::with_provider(Arc::new(provider), dimensions)
            }
        }
    }

    pub fn dimensions(&self) -> usize {
        self.fallback.dimensions()
    }

    /// Model name of the active strategy.
    pub fn model_name(&self) -> &str {
        match &self.primary {
            Some(provider) => provider.model_name(),
            None => self.fallback.model_name(),
        }
    }

    /// Embed text, falling back to the hash transform on any failure.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        if let Some(provider) = &self.primary {
            match provider.embed(text).await {
                Ok(vector) if vector.len() == self.dimensions() => return vector,
                Ok(vector) => warn!(
                    "embedding dimension mismatch, using fallback (model={}, expected={}, actual={})",
                    provider.model_name(),
                    self.dimensions(),
                    vector.len()
                ),
                Err(err) => warn!(
                    "embedding provider failed, using fallback (model={}): {err}",
                    provider.model_name()
                ),
            }
        }
        debug!("hash embedding (len={})", text.len());
        self.fallback.vector_for(text)
    }

    /// Zero vector used for broad, non-semantic lookups.
    pub fn zero(&self) -> Vec<f32> {
        vec![0.0; self.dimensions()]
    }
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("model", &self.model_name())
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Embedder, EmbeddingProvider};
    use crate::error::MemoryError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct BrokenProvider;

    #[async_trait]
    impl EmbeddingProvider for BrokenProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, MemoryError> {
            Err(MemoryError::Embedding("offline".to_string()))
        }

        fn model_name(&self) -> &str {
            "broken"
        }

        fn dimensions(&self) -> usize {
            8
        }
    }

    struct ShortProvider;

    #[async_trait]
    impl EmbeddingProvider for ShortProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, MemoryError> {
            Ok(vec![1.0; 3])
        }

        fn model_name(&self) -> &str {
            "short"
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    #[tokio::test]
    async fn provider_failure_resolves_through_fallback() {
        let embedder = Embedder::with_provider(Arc::new(BrokenProvider), 8);
        let vector = embedder.embed("hello").await;
        assert_eq!(vector, Embedder::hash(8).embed("hello").await);
    }

    #[tokio::test]
    async fn wrong_length_vector_resolves_through_fallback() {
        let embedder = Embedder::with_provider(Arc::new(ShortProvider), 8);
        let vector = embedder.embed("hello").await;
        assert_eq!(vector.len(), 8);
    }

    #[tokio::test]
    async fn hash_embedding_is_deterministic_with_fixed_length() {
        let embedder = Embedder::hash(384);
        let first = embedder.embed("organize my specs").await;
        let second = embedder.embed("organize my specs").await;
        assert_eq!(first.len(), 384);
        assert_eq!(first, second);
        assert!(first != embedder.embed("organize my prompts").await);
    }
}

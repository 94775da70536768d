use async_trait::async_trait;
use lectern_rs_memory::{EmbeddingProvider, MemoryError};
use parking_lot::Mutex;
use std::sync::Arc;

/// One vector component per keyword, in order.
pub const KEYWORDS: [&str; 8] = [
    "rust", "python", "database", "memory", "search", "network", "cooking", "music",
];

/// Bag-of-keywords embedder: component `i` is 1.0 when the text mentions
/// `KEYWORDS[i]`. Components past the keywords stay 0.0.
#[derive(Debug, Clone)]
pub struct KeywordEmbedder {
    dims: usize,
}

impl KeywordEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut vector = vec![0.0; self.dims];
        for (slot, keyword) in vector.iter_mut().zip(KEYWORDS) {
            if lower.contains(keyword) {
                *slot = 1.0;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        Ok(self.vector_for(text))
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Embedder that always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, MemoryError> {
        Err(MemoryError::Embedding("embedding backend unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }

    fn dimensions(&self) -> usize {
        0
    }
}

/// Keyword embedder that remembers every text it was asked to embed.
#[derive(Debug, Clone)]
pub struct RecordingEmbedder {
    inner: KeywordEmbedder,
    texts: Arc<Mutex<Vec<String>>>,
}

impl RecordingEmbedder {
    pub fn new(dims: usize) -> Self {
        Self {
            inner: KeywordEmbedder::new(dims),
            texts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for RecordingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        self.texts.lock().push(text.to_string());
        self.inner.embed(text).await
    }

    fn model_name(&self) -> &str {
        "recording-test"
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

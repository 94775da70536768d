//! Deterministic hash-based embedding.
//!
//! The text is hashed to a 32-bit seed and component `i` is
//! `sin((seed + i) * FREQUENCY)`. Identical texts always map to identical
//! vectors, but distances between vectors carry no semantic meaning.

use super::EmbeddingProvider;
use crate::error::MemoryError;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

const FREQUENCY: f64 = 0.1;
const MODEL_NAME: &str = "hash-sin-v1";

/// Non-semantic fallback embedding provider.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dims: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    /// Compute the vector synchronously.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let seed = f64::from(seed_for(text));
        (0..self.dims)
            .map(|index| ((seed + index as f64) * FREQUENCY).sin() as f32)
            .collect()
    }
}

/// Fold the first four digest bytes into the seed.
fn seed_for(text: &str) -> u32 {
    let digest = Sha256::digest(text.as_bytes());
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        Ok(self.vector_for(text))
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

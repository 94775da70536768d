//! Engine handle wiring the store and components together.

use crate::capture::CapturePolicy;
use crate::documents::{DocumentIndex, DocumentOptions};
use crate::embedding::{DEFAULT_DIMENSIONS, Embedder, EmbeddingBackend};
use crate::error::MemoryError;
use crate::insights::{InsightGenerator, InsightOptions};
use crate::memory::MemoryManager;
use crate::patterns::{PatternMergePolicy, PatternTracker};
use crate::store::VectorStore;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Options for building a [`MemoryEngine`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Directory holding the table files.
    pub root: PathBuf,
    pub dimensions: usize,
    pub embedding: EmbeddingBackend,
    pub capture: CapturePolicy,
    pub pattern_policy: PatternMergePolicy,
    pub insights: InsightOptions,
    pub documents: DocumentOptions,
}

impl EngineOptions {
    /// Hash embeddings and default settings rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dimensions: DEFAULT_DIMENSIONS,
            embedding: EmbeddingBackend::Hash,
            capture: CapturePolicy::default(),
            pattern_policy: PatternMergePolicy::default(),
            insights: InsightOptions::default(),
            documents: DocumentOptions::default(),
        }
    }
}

/// Owns the store and every component. Share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct MemoryEngine {
    store: Arc<VectorStore>,
    embedder: Embedder,
    memories: MemoryManager,
    patterns: PatternTracker,
    insights: InsightGenerator,
    documents: DocumentIndex,
}

impl MemoryEngine {
    /// Build the engine with the embedder selected by `options.embedding`.
    /// No IO happens until first use.
    pub fn new(options: EngineOptions) -> Self {
        let embedder = Embedder::from_backend(&options.embedding, options.dimensions);
        Self::with_embedder(options, embedder)
    }

    /// Build the engine around a caller-supplied embedder.
    pub fn with_embedder(options: EngineOptions, embedder: Embedder) -> Self {
        let store = Arc::new(VectorStore::new(&options.root, options.dimensions));
        info!(
            "memory engine configured (root={}, dimensions={}, model={})",
            options.root.display(),
            options.dimensions,
            embedder.model_name()
        );
        Self {
            memories: MemoryManager::new(store.clone(), embedder.clone(), options.capture),
            patterns: PatternTracker::new(store.clone(), embedder.clone(), options.pattern_policy),
            insights: InsightGenerator::new(store.clone(), embedder.clone(), options.insights),
            documents: DocumentIndex::new(store.clone(), embedder.clone(), options.documents),
            store,
            embedder,
        }
    }

    /// Connect eagerly, surfacing creation or schema failures.
    pub async fn connect(&self) -> Result<(), MemoryError> {
        self.store.connect().await
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    pub fn memories(&self) -> &MemoryManager {
        &self.memories
    }

    pub fn patterns(&self) -> &PatternTracker {
        &self.patterns
    }

    pub fn insights(&self) -> &InsightGenerator {
        &self.insights
    }

    pub fn documents(&self) -> &DocumentIndex {
        &self.documents
    }
}

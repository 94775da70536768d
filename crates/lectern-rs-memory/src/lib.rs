//! Adaptive memory and retrieval engine for Lectern.

pub mod capture;
pub mod documents;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod insights;
pub mod memory;
pub mod model;
pub mod patterns;
pub mod store;

/// Capture policy applied before embedding.
pub use capture::CapturePolicy;
/// Document indexing and hybrid search.
pub use documents::{DocumentIndex, DocumentOptions, DocumentSearchOptions};
/// Embedding providers.
pub use embedding::{
    DEFAULT_DIMENSIONS, Embedder, EmbeddingBackend, EmbeddingProvider, HashEmbeddingProvider,
    OpenAiEmbeddingProvider,
};
/// Engine handle.
pub use engine::{EngineOptions, MemoryEngine};
/// Memory error type.
pub use error::MemoryError;
/// Insight generation.
pub use insights::{
    InsightDraft, InsightGenerator, InsightOptions, InsightRule, InsightSnapshot,
    MemoryVolumeRule, RecurringPatternRule,
};
/// Memory manager.
pub use memory::MemoryManager;
/// Record models.
pub use model::{
    DocumentChunk, DocumentChunkRecord, DocumentHit, IndexDocument, InsightRecord, MemoryHit,
    MemoryLayer, MemoryRecord, MemoryStats, Metadata, NewMemory, PatternObservation,
    PatternRecord,
};
/// Pattern consolidation.
pub use patterns::{DEFAULT_MERGE_DISTANCE, PatternMergePolicy, PatternTracker};
/// Vector store.
pub use store::{Filter, Neighbor, NeighborQuery, ScanQuery, Table, VectorStore};

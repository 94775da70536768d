//! Record models persisted by the memory engine.
//!
//! Every record is stored as one JSON row. Rows are never updated in place:
//! a change is a new row carrying the same `id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Arbitrary key/value bag attached to records.
pub type Metadata = Map<String, Value>;

/// Retention layer of a memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryLayer {
    #[default]
    ShortTerm,
    LongTerm,
}

impl MemoryLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryLayer::ShortTerm => "short_term",
            MemoryLayer::LongTerm => "long_term",
        }
    }
}

/// Persisted memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    /// Free-form kind tag such as `fact`, `insight` or `system`.
    #[serde(rename = "type")]
    pub memory_type: String,
    pub layer: MemoryLayer,
    pub content: String,
    pub vector: Vec<f32>,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    /// Write-time snapshot; reads never bump it.
    pub access_count: u64,
    pub confidence: f32,
    pub relevance_score: f32,
    pub importance: f32,
    #[serde(default)]
    pub context: Vec<String>,
    /// Weak references to other memory ids; never dereferenced by the store.
    #[serde(default)]
    pub related_ids: Vec<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Input for creating a memory.
#[derive(Debug, Clone, Default)]
pub struct NewMemory {
    pub content: String,
    pub memory_type: String,
    /// Defaults to 0.5 when absent.
    pub importance: Option<f32>,
    pub tags: Vec<String>,
    pub context: Vec<String>,
    pub related_ids: Vec<String>,
    pub metadata: Metadata,
}

impl NewMemory {
    pub fn new(content: impl Into<String>, memory_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            memory_type: memory_type.into(),
            ..Self::default()
        }
    }

    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context<I, S>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context = context.into_iter().map(Into::into).collect();
        self
    }
}

/// Projection of a memory row returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryHit {
    pub id: String,
    #[serde(rename = "type")]
    pub memory_type: String,
    pub layer: MemoryLayer,
    pub content: String,
    pub importance: f32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    /// Distance to the query vector (lower is closer).
    #[serde(default)]
    pub distance: f32,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub memories: usize,
    pub patterns: usize,
    pub insights: usize,
    pub document_chunks: usize,
}

/// Persisted usage pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub id: String,
    pub pattern_type: String,
    #[serde(default)]
    pub entity_ids: Vec<String>,
    pub frequency: u64,
    pub vector: Vec<f32>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Observation handed to the pattern tracker.
#[derive(Debug, Clone, Default)]
pub struct PatternObservation {
    /// Defaults to a fresh UUID.
    pub id: Option<String>,
    pub pattern_type: String,
    pub entity_ids: Vec<String>,
    /// Text embedded when no explicit vector is supplied.
    pub signature: String,
    pub vector: Option<Vec<f32>>,
    /// Frequency kept when no prior pattern matches.
    pub frequency: u64,
    pub metadata: Metadata,
}

impl PatternObservation {
    pub fn new(pattern_type: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            pattern_type: pattern_type.into(),
            signature: signature.into(),
            ..Self::default()
        }
    }

    pub fn with_entities<I, S>(mut self, entity_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity_ids = entity_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = Some(vector);
        self
    }
}

/// Persisted insight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub id: String,
    pub insight_text: String,
    pub category: String,
    pub vector: Vec<f32>,
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
    pub dismissed: bool,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Persisted document chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunkRecord {
    /// `{document_id}:{chunk_id}`.
    pub id: String,
    pub document_id: String,
    pub chunk_id: String,
    pub content: String,
    pub vector: Vec<f32>,
    pub position: u64,
    pub file_path: String,
    pub file_type: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub chunk_tokens: u64,
    #[serde(default)]
    pub metadata: Metadata,
}

impl DocumentChunkRecord {
    pub fn composite_id(document_id: &str, chunk_id: &str) -> String {
        format!("{document_id}:{chunk_id}")
    }
}

/// Input for indexing a single chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub document_id: String,
    pub chunk_id: String,
    pub content: String,
    #[serde(default)]
    pub position: u64,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub title: String,
    /// Defaults to the whitespace word count of `content`.
    #[serde(default)]
    pub chunk_tokens: Option<u64>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Input for splitting and indexing a whole document.
#[derive(Debug, Clone, Default)]
pub struct IndexDocument {
    pub document_id: String,
    pub content: String,
    pub file_path: String,
    pub file_type: String,
    pub title: String,
}

/// Chunk row returned by document search, without its vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHit {
    pub id: String,
    pub document_id: String,
    pub chunk_id: String,
    pub content: String,
    pub position: u64,
    pub file_path: String,
    pub file_type: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub chunk_tokens: u64,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub distance: f32,
}

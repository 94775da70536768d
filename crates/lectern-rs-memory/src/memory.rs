//! Short/long-term memory records.

use crate::capture::CapturePolicy;
use crate::embedding::Embedder;
use crate::error::MemoryError;
use crate::model::{MemoryHit, MemoryLayer, MemoryRecord, MemoryStats, NewMemory};
use crate::store::{Filter, NeighborQuery, ScanQuery, Table, VectorStore};
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_IMPORTANCE: f32 = 0.5;

/// Stores and retrieves memories.
#[derive(Debug, Clone)]
pub struct MemoryManager {
    store: Arc<VectorStore>,
    embedder: Embedder,
    capture: CapturePolicy,
}

impl MemoryManager {
    pub fn new(store: Arc<VectorStore>, embedder: Embedder, capture: CapturePolicy) -> Self {
        Self {
            store,
            embedder,
            capture,
        }
    }

    /// Sanitize, embed and append a new short-term memory.
    pub async fn add_memory(&self, input: NewMemory) -> Result<MemoryRecord, MemoryError> {
        let content = self.capture.apply(&input.content)?;
        let vector = self.embedder.embed(&content).await;
        let now = Utc::now();
        let record = MemoryRecord {
            id: Uuid::new_v4().to_string(),
            memory_type: input.memory_type,
            layer: MemoryLayer::ShortTerm,
            content,
            vector,
            created_at: now,
            last_accessed: now,
            access_count: 1,
            confidence: 1.0,
            relevance_score: 1.0,
            importance: input.importance.unwrap_or(DEFAULT_IMPORTANCE),
            context: input.context,
            related_ids: input.related_ids,
            tags: input.tags.into_iter().collect(),
            metadata: input.metadata,
        };
        self.store
            .insert(Table::Memories, std::slice::from_ref(&record))
            .await?;
        info!(
            "stored memory (id={}, type={}, content_len={})",
            record.id,
            record.memory_type,
            record.content.len()
        );
        Ok(record)
    }

    /// Memories nearest to `query`. Empty on failure.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<MemoryHit> {
        let vector = self.embedder.embed(query).await;
        let hits: Vec<MemoryHit> = self
            .store
            .nearest_neighbors::<MemoryRecord>(Table::Memories, &vector, NeighborQuery::new(limit))
            .await
            .into_iter()
            .map(|neighbor| {
                let record = neighbor.record;
                MemoryHit {
                    id: record.id,
                    memory_type: record.memory_type,
                    layer: record.layer,
                    content: record.content,
                    importance: record.importance,
                    tags: record.tags,
                    created_at: record.created_at,
                    distance: neighbor.distance,
                }
            })
            .collect();
        debug!("memory search (limit={}, returned={})", limit, hits.len());
        hits
    }

    /// Row counts of every table.
    pub async fn get_stats(&self) -> MemoryStats {
        MemoryStats {
            memories: self.store.count(Table::Memories).await,
            patterns: self.store.count(Table::Patterns).await,
            insights: self.store.count(Table::Insights).await,
            document_chunks: self.store.count(Table::DocumentChunks).await,
        }
    }

    /// Latest row for `id`.
    pub async fn get_memory(&self, id: &str) -> Option<MemoryRecord> {
        self.store
            .scan::<MemoryRecord>(Table::Memories, ScanQuery::filtered(Filter::eq("id", id)))
            .await
            .pop()
    }

    /// Append a long-term copy of a memory. Returns `None` for unknown ids.
    pub async fn promote(&self, id: &str) -> Result<Option<MemoryRecord>, MemoryError> {
        let Some(current) = self.get_memory(id).await else {
            return Ok(None);
        };
        let promoted = MemoryRecord {
            layer: MemoryLayer::LongTerm,
            last_accessed: Utc::now(),
            access_count: current.access_count.saturating_add(1),
            ..current
        };
        self.store
            .insert(Table::Memories, std::slice::from_ref(&promoted))
            .await?;
        info!("promoted memory (id={})", promoted.id);
        Ok(Some(promoted))
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryManager;
    use crate::capture::CapturePolicy;
    use crate::embedding::Embedder;
    use crate::model::{MemoryLayer, NewMemory};
    use crate::store::VectorStore;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn manager(root: &std::path::Path) -> MemoryManager {
        MemoryManager::new(
            Arc::new(VectorStore::new(root, 16)),
            Embedder::hash(16),
            CapturePolicy::default(),
        )
    }

    #[tokio::test]
    async fn add_memory_fills_defaults() {
        let temp = tempdir().expect("tempdir");
        let manager = manager(temp.path());
        let record = manager
            .add_memory(NewMemory::new("prefers rust", "preference").with_tags(["lang", "lang"]))
            .await
            .expect("add");
        assert_eq!(record.layer, MemoryLayer::ShortTerm);
        assert_eq!(record.importance, 0.5);
        assert_eq!(record.access_count, 1);
        assert_eq!(record.confidence, 1.0);
        assert_eq!(record.created_at, record.last_accessed);
        assert_eq!(record.tags.len(), 1);
        assert_eq!(record.vector.len(), 16);
    }

    #[tokio::test]
    async fn exact_content_is_nearest_hit() {
        let temp = tempdir().expect("tempdir");
        let manager = manager(temp.path());
        for content in ["alpha", "beta", "gamma"] {
            manager
                .add_memory(NewMemory::new(content, "fact"))
                .await
                .expect("add");
        }
        let hits = manager.search("beta", 3).await;
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].content, "beta");
        assert_eq!(hits[0].distance, 0.0);
    }

    #[tokio::test]
    async fn promote_appends_long_term_copy() {
        let temp = tempdir().expect("tempdir");
        let manager = manager(temp.path());
        let record = manager
            .add_memory(NewMemory::new("keep this", "fact").with_importance(0.9))
            .await
            .expect("add");

        let promoted = manager
            .promote(&record.id)
            .await
            .expect("promote")
            .expect("known id");
        assert_eq!(promoted.layer, MemoryLayer::LongTerm);
        assert_eq!(promoted.access_count, 2);

        let latest = manager.get_memory(&record.id).await.expect("latest");
        assert_eq!(latest.layer, MemoryLayer::LongTerm);
        assert_eq!(manager.get_stats().await.memories, 2);
        assert_eq!(manager.promote("missing").await.expect("promote"), None);
    }
}

//! Usage pattern consolidation.

use crate::embedding::Embedder;
use crate::error::MemoryError;
use crate::model::{PatternObservation, PatternRecord};
use crate::store::{NeighborQuery, ScanQuery, Table, VectorStore};
use chrono::Utc;
use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Default distance under which two observations count as the same pattern.
pub const DEFAULT_MERGE_DISTANCE: f32 = 0.3;

/// Decides whether the nearest prior pattern absorbs a new observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatternMergePolicy {
    /// Any prior row matches, however distant.
    Nearest,
    /// Only a prior row within the given distance matches.
    WithinDistance(f32),
}

impl Default for PatternMergePolicy {
    fn default() -> Self {
        PatternMergePolicy::WithinDistance(DEFAULT_MERGE_DISTANCE)
    }
}

impl PatternMergePolicy {
    /// `None` keeps the unthresholded behavior.
    pub fn from_distance(distance: Option<f32>) -> Self {
        match distance {
            Some(distance) => PatternMergePolicy::WithinDistance(distance),
            None => PatternMergePolicy::Nearest,
        }
    }

    fn accepts(&self, distance: f32) -> bool {
        match self {
            PatternMergePolicy::Nearest => true,
            PatternMergePolicy::WithinDistance(max) => distance <= *max,
        }
    }
}

/// Tracks recurring patterns by frequency.
#[derive(Debug, Clone)]
pub struct PatternTracker {
    store: Arc<VectorStore>,
    embedder: Embedder,
    policy: PatternMergePolicy,
}

impl PatternTracker {
    pub fn new(store: Arc<VectorStore>, embedder: Embedder, policy: PatternMergePolicy) -> Self {
        Self {
            store,
            embedder,
            policy,
        }
    }

    pub fn policy(&self) -> PatternMergePolicy {
        self.policy
    }

    /// Record an observation, folding it into the nearest prior pattern when
    /// the merge policy accepts it. A new row is always appended; a merged row
    /// keeps the prior pattern's id so it supersedes that row on read.
    ///
    /// The neighbor lookup and the append are separate steps; concurrent callers can
    /// lose increments.
    pub async fn track_pattern(
        &self,
        observation: PatternObservation,
    ) -> Result<PatternRecord, MemoryError> {
        let vector = match observation.vector {
            Some(vector) => vector,
            None => self.embedder.embed(&observation.signature).await,
        };
        let prior = self
            .store
            .nearest_neighbors::<PatternRecord>(Table::Patterns, &vector, NeighborQuery::new(1))
            .await
            .into_iter()
            .next()
            .filter(|neighbor| self.policy.accepts(neighbor.distance));

        let now = Utc::now();
        let mut metadata = observation.metadata;
        let (id, frequency, first_seen) = match &prior {
            Some(neighbor) => {
                metadata.insert(
                    "merged_from".to_string(),
                    Value::String(neighbor.record.id.clone()),
                );
                (
                    neighbor.record.id.clone(),
                    neighbor.record.frequency.saturating_add(1),
                    neighbor.record.first_seen,
                )
            }
            None => (
                observation
                    .id
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                observation.frequency,
                now,
            ),
        };

        let record = PatternRecord {
            id,
            pattern_type: observation.pattern_type,
            entity_ids: observation.entity_ids,
            frequency,
            vector,
            first_seen,
            last_seen: now,
            metadata,
        };
        self.store
            .insert(Table::Patterns, std::slice::from_ref(&record))
            .await?;
        match prior {
            Some(neighbor) => info!(
                "pattern merged (id={}, merged_from={}, distance={}, frequency={})",
                record.id, neighbor.record.id, neighbor.distance, record.frequency
            ),
            None => debug!(
                "pattern stored (id={}, frequency={})",
                record.id, record.frequency
            ),
        }
        Ok(record)
    }

    /// Latest row per pattern id, most frequent first.
    pub async fn top_patterns(&self, limit: usize) -> Vec<PatternRecord> {
        most_frequent(&self.store, limit).await
    }
}

pub(crate) async fn most_frequent(store: &VectorStore, limit: usize) -> Vec<PatternRecord> {
    let mut patterns = store
        .scan::<PatternRecord>(Table::Patterns, ScanQuery::default())
        .await;
    patterns.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    patterns.truncate(limit);
    patterns
}

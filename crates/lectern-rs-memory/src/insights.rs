//! Rule-based insight generation.

use crate::embedding::Embedder;
use crate::error::MemoryError;
use crate::model::{InsightRecord, Metadata, PatternRecord};
use crate::patterns::most_frequent;
use crate::store::{Filter, NeighborQuery, ScanQuery, Table, VectorStore};
use chrono::Utc;
use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Facts the rules look at.
#[derive(Debug, Clone, Default)]
pub struct InsightSnapshot {
    pub memory_count: usize,
    pub top_patterns: Vec<PatternRecord>,
}

/// Insight emitted by a rule, before it is embedded and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightDraft {
    pub insight_text: String,
    pub category: String,
    pub confidence: f32,
    pub metadata: Metadata,
}

impl InsightDraft {
    pub fn new(insight_text: impl Into<String>, category: impl Into<String>, confidence: f32) -> Self {
        Self {
            insight_text: insight_text.into(),
            category: category.into(),
            confidence,
            metadata: Metadata::new(),
        }
    }
}

/// Rule evaluated on every generation pass.
pub trait InsightRule: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, snapshot: &InsightSnapshot) -> Vec<InsightDraft>;
}

/// Suggests consolidation once the memory table grows past a threshold.
#[derive(Debug, Clone)]
pub struct MemoryVolumeRule {
    pub threshold: usize,
}

impl Default for MemoryVolumeRule {
    fn default() -> Self {
        Self { threshold: 10 }
    }
}

impl InsightRule for MemoryVolumeRule {
    fn name(&self) -> &str {
        "memory_volume"
    }

    fn evaluate(&self, snapshot: &InsightSnapshot) -> Vec<InsightDraft> {
        if snapshot.memory_count <= self.threshold {
            return Vec::new();
        }
        vec![InsightDraft::new(
            format!(
                "You have {} memories stored. Consider reviewing and consolidating them.",
                snapshot.memory_count
            ),
            "usage",
            1.0,
        )]
    }
}

/// Flags patterns seen at least `min_frequency` times.
#[derive(Debug, Clone)]
pub struct RecurringPatternRule {
    pub min_frequency: u64,
}

impl Default for RecurringPatternRule {
    fn default() -> Self {
        Self { min_frequency: 5 }
    }
}

impl InsightRule for RecurringPatternRule {
    fn name(&self) -> &str {
        "recurring_pattern"
    }

    fn evaluate(&self, snapshot: &InsightSnapshot) -> Vec<InsightDraft> {
        snapshot
            .top_patterns
            .iter()
            .filter(|pattern| pattern.frequency >= self.min_frequency)
            .map(|pattern| {
                let mut draft = InsightDraft::new(
                    format!(
                        "The {} pattern has recurred {} times. Consider saving it as a template.",
                        pattern.pattern_type, pattern.frequency
                    ),
                    "pattern",
                    0.8,
                );
                draft
                    .metadata
                    .insert("pattern_id".to_string(), Value::String(pattern.id.clone()));
                draft
            })
            .collect()
    }
}

/// Insight generator settings.
#[derive(Debug, Clone)]
pub struct InsightOptions {
    pub memory_volume_threshold: usize,
    pub recurring_pattern_frequency: u64,
    /// How many patterns the snapshot carries.
    pub pattern_window: usize,
    pub list_limit: usize,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            memory_volume_threshold: 10,
            recurring_pattern_frequency: 5,
            pattern_window: 10,
            list_limit: 20,
        }
    }
}

/// Evaluates rules and manages stored insights.
#[derive(Clone)]
pub struct InsightGenerator {
    store: Arc<VectorStore>,
    embedder: Embedder,
    rules: Vec<Arc<dyn InsightRule>>,
    options: InsightOptions,
}

impl InsightGenerator {
    /// Generator with the built-in rules.
    pub fn new(store: Arc<VectorStore>, embedder: Embedder, options: InsightOptions) -> Self {
        let rules: Vec<Arc<dyn InsightRule>> = vec![
            Arc::new(MemoryVolumeRule {
                threshold: options.memory_volume_threshold,
            }),
            Arc::new(RecurringPatternRule {
                min_frequency: options.recurring_pattern_frequency,
            }),
        ];
        Self {
            store,
            embedder,
            rules,
            options,
        }
    }

    /// Append a rule; rules run in registration order.
    pub fn with_rule(mut self, rule: Arc<dyn InsightRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.rules.iter().map(|rule| rule.name().to_string()).collect()
    }

    async fn snapshot(&self) -> InsightSnapshot {
        InsightSnapshot {
            memory_count: self.store.count(Table::Memories).await,
            top_patterns: most_frequent(&self.store, self.options.pattern_window).await,
        }
    }

    /// Run every rule, then embed and persist what they emit.
    pub async fn generate_insights(&self) -> Result<Vec<InsightRecord>, MemoryError> {
        let snapshot = self.snapshot().await;
        let mut generated = Vec::new();
        for rule in &self.rules {
            let drafts = rule.evaluate(&snapshot);
            debug!(
                "insight rule evaluated (rule={}, emitted={})",
                rule.name(),
                drafts.len()
            );
            for draft in drafts {
                let record = InsightRecord {
                    id: Uuid::new_v4().to_string(),
                    vector: self.embedder.embed(&draft.insight_text).await,
                    insight_text: draft.insight_text,
                    category: draft.category,
                    confidence: draft.confidence,
                    created_at: Utc::now(),
                    dismissed: false,
                    metadata: draft.metadata,
                };
                self.store
                    .insert(Table::Insights, std::slice::from_ref(&record))
                    .await?;
                generated.push(record);
            }
        }
        info!(
            "generated insights (count={}, memories={})",
            generated.len(),
            snapshot.memory_count
        );
        Ok(generated)
    }

    /// Undismissed insights, ranked against a zero vector.
    pub async fn list_insights(&self) -> Vec<InsightRecord> {
        let query = self.embedder.zero();
        self.store
            .nearest_neighbors::<InsightRecord>(
                Table::Insights,
                &query,
                NeighborQuery::new(self.options.list_limit)
                    .with_filter(Filter::eq("dismissed", false)),
            )
            .await
            .into_iter()
            .map(|neighbor| neighbor.record)
            .collect()
    }

    /// Append a dismissed copy of the insight. `false` for unknown ids.
    pub async fn dismiss_insight(&self, id: &str) -> Result<bool, MemoryError> {
        let Some(current) = self
            .store
            .try_scan::<InsightRecord>(Table::Insights, ScanQuery::filtered(Filter::eq("id", id)))
            .await?
            .pop()
        else {
            debug!("dismiss ignored unknown insight (id={id})");
            return Ok(false);
        };
        let dismissed = InsightRecord {
            dismissed: true,
            ..current
        };
        self.store
            .insert(Table::Insights, std::slice::from_ref(&dismissed))
            .await?;
        info!("dismissed insight (id={id})");
        Ok(true)
    }
}

impl std::fmt::Debug for InsightGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightGenerator")
            .field("rules", &self.rule_names())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        InsightDraft, InsightGenerator, InsightOptions, InsightRule, InsightSnapshot,
        MemoryVolumeRule, RecurringPatternRule,
    };
    use crate::embedding::Embedder;
    use crate::model::PatternRecord;
    use crate::store::VectorStore;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn pattern(id: &str, frequency: u64) -> PatternRecord {
        PatternRecord {
            id: id.to_string(),
            pattern_type: "workflow".to_string(),
            entity_ids: Vec::new(),
            frequency,
            vector: vec![0.0; 4],
            first_seen: Utc::now(),
            last_seen: Utc::now(),
            metadata: Default::default(),
        }
    }

    #[test]
    fn volume_rule_fires_strictly_above_threshold() {
        let rule = MemoryVolumeRule::default();
        let at = InsightSnapshot {
            memory_count: 10,
            ..InsightSnapshot::default()
        };
        assert!(rule.evaluate(&at).is_empty());
        let above = InsightSnapshot {
            memory_count: 11,
            ..InsightSnapshot::default()
        };
        let drafts = rule.evaluate(&above);
        assert_eq!(drafts.len(), 1);
        assert_eq!(
            drafts[0].insight_text,
            "You have 11 memories stored. Consider reviewing and consolidating them."
        );
        assert_eq!(drafts[0].category, "usage");
    }

    #[test]
    fn recurring_rule_tags_pattern_id() {
        let rule = RecurringPatternRule { min_frequency: 3 };
        let snapshot = InsightSnapshot {
            memory_count: 0,
            top_patterns: vec![pattern("hot", 4), pattern("cold", 1)],
        };
        let drafts = rule.evaluate(&snapshot);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].metadata["pattern_id"], "hot");
        assert_eq!(drafts[0].confidence, 0.8);
    }

    struct AlwaysRule;

    impl InsightRule for AlwaysRule {
        fn name(&self) -> &str {
            "always"
        }

        fn evaluate(&self, _snapshot: &InsightSnapshot) -> Vec<InsightDraft> {
            vec![InsightDraft::new("hello", "custom", 0.5)]
        }
    }

    #[tokio::test]
    async fn custom_rules_persist_and_dismiss() {
        let temp = tempdir().expect("tempdir");
        let generator = InsightGenerator::new(
            Arc::new(VectorStore::new(temp.path(), 4)),
            Embedder::hash(4),
            InsightOptions::default(),
        )
        .with_rule(Arc::new(AlwaysRule));
        assert_eq!(
            generator.rule_names(),
            vec!["memory_volume", "recurring_pattern", "always"]
        );

        let generated = generator.generate_insights().await.expect("generate");
        assert_eq!(generated.len(), 1);
        assert_eq!(generator.list_insights().await.len(), 1);

        assert!(generator.dismiss_insight(&generated[0].id).await.expect("dismiss"));
        assert!(generator.list_insights().await.is_empty());
        assert!(!generator.dismiss_insight("unknown").await.expect("dismiss"));
    }
}

//! Read-path query engine: reconciliation, filtering, ranking and paging.

use super::filter::Filter;
use crate::error::MemoryError;
use log::warn;
use serde_json::Value;
use std::collections::HashMap;

/// Row as read from a table file, tagged with its append sequence.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StoredRow {
    pub seq: usize,
    pub value: Value,
}

impl StoredRow {
    pub fn id(&self) -> Option<&str> {
        self.value.get("id").and_then(Value::as_str)
    }
}

/// Collapse rows sharing an id to the most recently appended one.
///
/// Output keeps append order of the surviving rows. Rows without an id are
/// kept as-is.
pub(crate) fn reconcile_latest(rows: Vec<StoredRow>) -> Vec<StoredRow> {
    let mut latest: HashMap<String, usize> = HashMap::new();
    for row in &rows {
        if let Some(id) = row.id() {
            latest.insert(id.to_string(), row.seq);
        }
    }
    rows.into_iter()
        .filter(|row| match row.id() {
            Some(id) => latest.get(id) == Some(&row.seq),
            None => true,
        })
        .collect()
}

pub(crate) fn apply_filter(
    rows: Vec<StoredRow>,
    filter: Option<&Filter>,
) -> Result<Vec<StoredRow>, MemoryError> {
    let Some(filter) = filter else {
        return Ok(rows);
    };
    filter.validate()?;
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if filter.matches(&row.value)? {
            kept.push(row);
        }
    }
    Ok(kept)
}

/// Euclidean distance between equal-length vectors.
pub(crate) fn l2_distance(left: &[f32], right: &[f32]) -> f32 {
    left.iter()
        .zip(right)
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f32>()
        .sqrt()
}

fn row_vector(row: &StoredRow) -> Option<Vec<f32>> {
    row.value
        .get("vector")?
        .as_array()?
        .iter()
        .map(|item| item.as_f64().map(|value| value as f32))
        .collect()
}

/// Rank rows by distance to `query`, ascending. Equal distances keep append order.
pub(crate) fn rank(rows: Vec<StoredRow>, query: &[f32]) -> Vec<(StoredRow, f32)> {
    let mut scored = Vec::with_capacity(rows.len());
    for row in rows {
        match row_vector(&row) {
            Some(vector) if vector.len() == query.len() => {
                let distance = l2_distance(&vector, query);
                scored.push((row, distance));
            }
            _ => warn!(
                "skipping row without usable vector (seq={}, id={})",
                row.seq,
                row.id().unwrap_or("-")
            ),
        }
    }
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    scored
}

pub(crate) fn paginate<T>(items: Vec<T>, offset: usize, limit: Option<usize>) -> Vec<T> {
    let iter = items.into_iter().skip(offset);
    match limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{StoredRow, apply_filter, l2_distance, paginate, rank, reconcile_latest};
    use crate::store::Filter;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn rows(values: Vec<Value>) -> Vec<StoredRow> {
        values
            .into_iter()
            .enumerate()
            .map(|(seq, value)| StoredRow { seq, value })
            .collect()
    }

    fn ids(rows: &[StoredRow]) -> Vec<String> {
        rows.iter()
            .map(|row| row.id().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn latest_append_wins_per_id() {
        let reconciled = reconcile_latest(rows(vec![
            json!({ "id": "a", "dismissed": false }),
            json!({ "id": "b", "dismissed": false }),
            json!({ "id": "a", "dismissed": true }),
        ]));
        assert_eq!(ids(&reconciled), vec!["b", "a"]);
        assert_eq!(reconciled[1].value["dismissed"], json!(true));
    }

    #[test]
    fn filter_runs_after_reconciliation() {
        let reconciled = reconcile_latest(rows(vec![
            json!({ "id": "a", "dismissed": false }),
            json!({ "id": "a", "dismissed": true }),
        ]));
        let filter = Filter::eq("dismissed", false);
        let kept = apply_filter(reconciled, Some(&filter)).expect("filter");
        assert!(kept.is_empty());
    }

    #[test]
    fn rank_orders_by_distance_and_keeps_ties_stable() {
        let ranked = rank(
            rows(vec![
                json!({ "id": "far", "vector": [3.0, 4.0] }),
                json!({ "id": "tie1", "vector": [1.0, 0.0] }),
                json!({ "id": "tie2", "vector": [0.0, 1.0] }),
                json!({ "id": "bad", "vector": [1.0] }),
            ]),
            &[0.0, 0.0],
        );
        let order: Vec<_> = ranked
            .iter()
            .map(|(row, _)| row.id().unwrap_or_default())
            .collect();
        assert_eq!(order, vec!["tie1", "tie2", "far"]);
        assert_eq!(ranked[2].1, 5.0);
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(l2_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
    }

    #[test]
    fn paginate_skips_and_limits() {
        assert_eq!(paginate(vec![1, 2, 3, 4], 1, Some(2)), vec![2, 3]);
        assert_eq!(paginate(vec![1, 2, 3], 2, None), vec![3]);
        assert!(paginate(vec![1], 5, None).is_empty());
    }
}

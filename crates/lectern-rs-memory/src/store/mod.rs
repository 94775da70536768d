//! Append-only, file-backed vector store.
//!
//! Each table is a JSONL file under the store root. The first line of a
//! table is an initialization header carrying the table name and vector
//! dimension; every following line is one row. Rows are never rewritten.

mod filter;
pub(crate) mod query;

pub use filter::Filter;

use crate::error::MemoryError;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use query::StoredRow;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

/// Known tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Memories,
    Patterns,
    Insights,
    DocumentChunks,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Memories,
        Table::Patterns,
        Table::Insights,
        Table::DocumentChunks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Memories => "memories",
            Table::Patterns => "patterns",
            Table::Insights => "insights",
            Table::DocumentChunks => "document_chunks",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TableHeader {
    #[serde(rename = "_table")]
    table: String,
    #[serde(rename = "_dimension")]
    dimension: usize,
    #[serde(rename = "_created_at")]
    created_at: DateTime<Utc>,
}

fn is_header(value: &Value) -> bool {
    value.get("_table").is_some()
}

/// Nearest-neighbor query options.
#[derive(Debug, Clone, Default)]
pub struct NeighborQuery {
    pub filter: Option<Filter>,
    pub limit: usize,
}

impl NeighborQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            filter: None,
            limit,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Filtered scan options. Rows come back in append order.
#[derive(Debug, Clone, Default)]
pub struct ScanQuery {
    pub filter: Option<Filter>,
    pub offset: usize,
    /// `None` returns every remaining row.
    pub limit: Option<usize>,
}

impl ScanQuery {
    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }
}

/// Ranked row with its distance to the query vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<T> {
    pub record: T,
    pub distance: f32,
}

/// File-backed vector store. Construction performs no IO; the first
/// operation connects.
#[derive(Debug)]
pub struct VectorStore {
    root: PathBuf,
    dimension: usize,
    connected: OnceCell<()>,
}

impl VectorStore {
    pub fn new(root: impl AsRef<Path>, dimension: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            dimension,
            connected: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.root.join(format!("{}.jsonl", table.name()))
    }

    /// Open the store, creating and seeding missing tables. Idempotent.
    pub async fn connect(&self) -> Result<(), MemoryError> {
        self.connected
            .get_or_try_init(|| async { self.initialize() })
            .await
            .map(|_| ())
    }

    fn initialize(&self) -> Result<(), MemoryError> {
        if self.dimension == 0 {
            return Err(MemoryError::Schema("dimension must be positive".to_string()));
        }
        std::fs::create_dir_all(&self.root)?;
        for table in Table::ALL {
            self.ensure_table(table)?;
        }
        info!(
            "connected vector store (root={}, dimension={})",
            self.root.display(),
            self.dimension
        );
        Ok(())
    }

    fn ensure_table(&self, table: Table) -> Result<(), MemoryError> {
        let path = self.table_path(table);
        let first_line = if path.exists() {
            let file = OpenOptions::new().read(true).open(&path)?;
            BufReader::new(file).lines().next().transpose()?
        } else {
            None
        };

        match first_line.filter(|line| !line.trim().is_empty()) {
            Some(line) => {
                let header: TableHeader = serde_json::from_str(&line).map_err(|err| {
                    MemoryError::Schema(format!(
                        "table {} has no valid header: {err}",
                        table.name()
                    ))
                })?;
                if header.dimension != self.dimension {
                    return Err(MemoryError::Schema(format!(
                        "table {} dimension mismatch (expected={}, actual={})",
                        table.name(),
                        self.dimension,
                        header.dimension
                    )));
                }
                debug!(
                    "opened table (table={}, created_at={})",
                    header.table, header.created_at
                );
            }
            None => {
                let header = TableHeader {
                    table: table.name().to_string(),
                    dimension: self.dimension,
                    created_at: Utc::now(),
                };
                let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
                writeln!(file, "{}", serde_json::to_string(&header)?)?;
                info!("created table (table={}, path={})", table.name(), path.display());
            }
        }
        Ok(())
    }

    /// Append rows. Every row needs a string `id` and a vector of the store dimension.
    pub async fn insert<T: Serialize>(
        &self,
        table: Table,
        records: &[T],
    ) -> Result<usize, MemoryError> {
        self.connect().await?;
        if records.is_empty() {
            return Ok(0);
        }
        let mut buffer = String::new();
        for record in records {
            let value = serde_json::to_value(record)?;
            self.validate_row(&value)?;
            buffer.push_str(&serde_json::to_string(&value)?);
            buffer.push('\n');
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.table_path(table))?;
        file.write_all(buffer.as_bytes())?;
        debug!(
            "inserted rows (table={}, count={})",
            table.name(),
            records.len()
        );
        Ok(records.len())
    }

    fn validate_row(&self, value: &Value) -> Result<(), MemoryError> {
        let Some(object) = value.as_object() else {
            return Err(MemoryError::InvalidRecord("row must be an object".to_string()));
        };
        if is_header(value) {
            return Err(MemoryError::InvalidRecord(
                "row uses reserved key _table".to_string(),
            ));
        }
        if !object.get("id").is_some_and(Value::is_string) {
            return Err(MemoryError::InvalidRecord("row needs a string id".to_string()));
        }
        let Some(vector) = object.get("vector").and_then(Value::as_array) else {
            return Err(MemoryError::InvalidRecord("row needs a vector".to_string()));
        };
        if vector.len() != self.dimension {
            return Err(MemoryError::Dimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Physical row count, duplicates included. Returns 0 on failure.
    pub async fn count(&self, table: Table) -> usize {
        match self.load_rows(table).await {
            Ok(rows) => rows.len(),
            Err(err) => {
                warn!("count failed (table={}): {err}", table.name());
                0
            }
        }
    }

    /// Rows nearest to `query`. Returns an empty list on failure.
    pub async fn nearest_neighbors<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &[f32],
        options: NeighborQuery,
    ) -> Vec<Neighbor<T>> {
        match self.try_nearest_neighbors(table, query, options).await {
            Ok(neighbors) => neighbors,
            Err(err) => {
                warn!("nearest neighbor query failed (table={}): {err}", table.name());
                Vec::new()
            }
        }
    }

    pub(crate) async fn try_nearest_neighbors<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &[f32],
        options: NeighborQuery,
    ) -> Result<Vec<Neighbor<T>>, MemoryError> {
        if query.len() != self.dimension {
            return Err(MemoryError::Dimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        let rows = query::reconcile_latest(self.load_rows(table).await?);
        let rows = query::apply_filter(rows, options.filter.as_ref())?;
        let ranked = query::paginate(query::rank(rows, query), 0, Some(options.limit));
        Ok(ranked
            .into_iter()
            .filter_map(|(row, distance)| {
                decode_row(table, row).map(|record| Neighbor { record, distance })
            })
            .collect())
    }

    /// Filtered rows in append order. Returns an empty list on failure.
    pub async fn scan<T: DeserializeOwned>(&self, table: Table, options: ScanQuery) -> Vec<T> {
        match self.try_scan(table, options).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!("scan failed (table={}): {err}", table.name());
                Vec::new()
            }
        }
    }

    pub(crate) async fn try_scan<T: DeserializeOwned>(
        &self,
        table: Table,
        options: ScanQuery,
    ) -> Result<Vec<T>, MemoryError> {
        let rows = query::reconcile_latest(self.load_rows(table).await?);
        let rows = query::apply_filter(rows, options.filter.as_ref())?;
        Ok(query::paginate(rows, options.offset, options.limit)
            .into_iter()
            .filter_map(|row| decode_row(table, row))
            .collect())
    }

    /// Read every data row of a table, skipping the header and unreadable lines.
    async fn load_rows(&self, table: Table) -> Result<Vec<StoredRow>, MemoryError> {
        self.connect().await?;
        let file = OpenOptions::new().read(true).open(self.table_path(table))?;
        let mut rows = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value = match serde_json::from_str::<Value>(&line) {
                Ok(value) => value,
                Err(err) => {
                    warn!(
                        "ignoring invalid row (table={}, line={}): {err}",
                        table.name(),
                        line_no + 1
                    );
                    continue;
                }
            };
            if is_header(&value) {
                continue;
            }
            rows.push(StoredRow {
                seq: rows.len(),
                value,
            });
        }
        Ok(rows)
    }
}

fn decode_row<T: DeserializeOwned>(table: Table, row: StoredRow) -> Option<T> {
    match serde_json::from_value(row.value) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(
                "ignoring undecodable row (table={}, seq={}): {err}",
                table.name(),
                row.seq
            );
            None
        }
    }
}

//! Document chunk indexing and hybrid (vector + scalar filter) search.

use crate::embedding::Embedder;
use crate::error::MemoryError;
use crate::model::{DocumentChunk, DocumentChunkRecord, DocumentHit, IndexDocument};
use crate::store::{Filter, NeighborQuery, ScanQuery, Table, VectorStore};
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;

/// Document index settings.
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    pub max_results: usize,
    /// Words per chunk for `index_document`.
    pub chunk_size: usize,
    /// Words shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            max_results: 20,
            chunk_size: 400,
            chunk_overlap: 80,
        }
    }
}

/// Options for `search_documents`.
#[derive(Debug, Clone, Default)]
pub struct DocumentSearchOptions {
    /// Allowed file types; empty means any.
    pub file_types: Vec<String>,
    /// Falls back to the index default.
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct DocumentIndex {
    store: Arc<VectorStore>,
    embedder: Embedder,
    options: DocumentOptions,
}

impl DocumentIndex {
    pub fn new(store: Arc<VectorStore>, embedder: Embedder, options: DocumentOptions) -> Self {
        Self {
            store,
            embedder,
            options,
        }
    }

    async fn build_record(&self, chunk: DocumentChunk) -> DocumentChunkRecord {
        let chunk_tokens = chunk
            .chunk_tokens
            .unwrap_or_else(|| chunk.content.split_whitespace().count() as u64);
        DocumentChunkRecord {
            id: DocumentChunkRecord::composite_id(&chunk.document_id, &chunk.chunk_id),
            vector: self.embedder.embed(&chunk.content).await,
            document_id: chunk.document_id,
            chunk_id: chunk.chunk_id,
            content: chunk.content,
            position: chunk.position,
            file_path: chunk.file_path,
            file_type: chunk.file_type,
            title: chunk.title,
            created_at: Utc::now(),
            chunk_tokens,
            metadata: chunk.metadata,
        }
    }

    /// Embed and append one chunk.
    pub async fn add_document_chunk(
        &self,
        chunk: DocumentChunk,
    ) -> Result<DocumentChunkRecord, MemoryError> {
        let record = self.build_record(chunk).await;
        self.store
            .insert(Table::DocumentChunks, std::slice::from_ref(&record))
            .await?;
        debug!(
            "indexed chunk (id={}, position={}, tokens={})",
            record.id, record.position, record.chunk_tokens
        );
        Ok(record)
    }

    /// Split a whole document into overlapping word windows and index them.
    pub async fn index_document(
        &self,
        document: IndexDocument,
    ) -> Result<Vec<DocumentChunkRecord>, MemoryError> {
        let windows = chunk_words(
            &document.content,
            self.options.chunk_size,
            self.options.chunk_overlap,
        );
        let mut records = Vec::with_capacity(windows.len());
        for (position, content) in windows.into_iter().enumerate() {
            let chunk = DocumentChunk {
                document_id: document.document_id.clone(),
                chunk_id: format!("chunk-{position}"),
                content,
                position: position as u64,
                file_path: document.file_path.clone(),
                file_type: document.file_type.clone(),
                title: document.title.clone(),
                chunk_tokens: None,
                metadata: Default::default(),
            };
            records.push(self.build_record(chunk).await);
        }
        self.store.insert(Table::DocumentChunks, &records).await?;
        info!(
            "indexed document (document_id={}, chunks={})",
            document.document_id,
            records.len()
        );
        Ok(records)
    }

    /// Chunks nearest to `query`, optionally restricted to file types. Empty on failure.
    pub async fn search_documents(
        &self,
        query: &str,
        options: DocumentSearchOptions,
    ) -> Vec<DocumentHit> {
        let limit = options.max_results.unwrap_or(self.options.max_results);
        let mut neighbor_query = NeighborQuery::new(limit);
        if !options.file_types.is_empty() {
            neighbor_query =
                neighbor_query.with_filter(Filter::any_of("file_type", options.file_types));
        }
        let vector = self.embedder.embed(query).await;
        let hits: Vec<DocumentHit> = self
            .store
            .nearest_neighbors::<DocumentChunkRecord>(Table::DocumentChunks, &vector, neighbor_query)
            .await
            .into_iter()
            .map(|neighbor| into_hit(neighbor.record, neighbor.distance))
            .collect();
        debug!("document search (limit={}, returned={})", limit, hits.len());
        hits
    }

    /// Every chunk of a document ordered by position, read from one
    /// reconciled snapshot. Empty on failure.
    pub async fn get_document_chunks(&self, document_id: &str) -> Vec<DocumentChunkRecord> {
        let mut chunks: Vec<DocumentChunkRecord> = self
            .store
            .scan(
                Table::DocumentChunks,
                ScanQuery::filtered(Filter::eq("document_id", document_id)),
            )
            .await;
        chunks.sort_by_key(|chunk| chunk.position);
        debug!(
            "listed document chunks (document_id={}, count={})",
            document_id,
            chunks.len()
        );
        chunks
    }
}

fn into_hit(record: DocumentChunkRecord, distance: f32) -> DocumentHit {
    DocumentHit {
        id: record.id,
        document_id: record.document_id,
        chunk_id: record.chunk_id,
        content: record.content,
        position: record.position,
        file_path: record.file_path,
        file_type: record.file_type,
        title: record.title,
        created_at: record.created_at,
        chunk_tokens: record.chunk_tokens,
        metadata: record.metadata,
        distance,
    }
}

/// Split text into windows of `size` words, consecutive windows sharing `overlap` words.
pub(crate) fn chunk_words(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || size == 0 {
        return Vec::new();
    }
    let step = if overlap < size { size - overlap } else { size };
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += step;
    }
    chunks
}

//! Document tools: chunk indexing, search, ordered retrieval.

use crate::builtins::utils::{parse_args, require_text, to_output};
use crate::{Tool, ToolContext, ToolError};
use async_trait::async_trait;
use lectern_rs_memory::{DocumentChunk, DocumentSearchOptions, IndexDocument, Metadata};
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

/// Indexes one pre-split chunk.
#[derive(Debug, Default)]
pub struct AddDocumentChunkTool;

#[derive(Debug, Deserialize)]
struct ChunkArgs {
    #[serde(alias = "documentId")]
    document_id: String,
    #[serde(alias = "chunkId")]
    chunk_id: String,
    content: String,
    #[serde(default)]
    position: u64,
    #[serde(default, alias = "filePath")]
    file_path: String,
    #[serde(default, alias = "fileType")]
    file_type: String,
    #[serde(default)]
    title: String,
    #[serde(default, alias = "chunkTokens")]
    chunk_tokens: Option<u64>,
    #[serde(default)]
    metadata: Metadata,
}

impl From<ChunkArgs> for DocumentChunk {
    fn from(args: ChunkArgs) -> Self {
        DocumentChunk {
            document_id: args.document_id,
            chunk_id: args.chunk_id,
            content: args.content,
            position: args.position,
            file_path: args.file_path,
            file_type: args.file_type,
            title: args.title,
            chunk_tokens: args.chunk_tokens,
            metadata: args.metadata,
        }
    }
}

#[async_trait]
impl Tool for AddDocumentChunkTool {
    fn name(&self) -> &str {
        "add_document_chunk"
    }

    fn description(&self) -> &str {
        "Index one chunk of a document for later search"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "documentId": { "type": "string" },
                "chunkId": { "type": "string" },
                "content": { "type": "string" },
                "position": { "type": "integer", "minimum": 0 },
                "filePath": { "type": "string" },
                "fileType": { "type": "string", "description": "Extension such as md or pdf." },
                "title": { "type": "string" },
                "chunkTokens": { "type": "integer", "minimum": 0 },
                "metadata": { "type": "object" }
            },
            "required": ["documentId", "chunkId", "content"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: ChunkArgs = parse_args(args)?;
        require_text("documentId", &input.document_id)?;
        require_text("chunkId", &input.chunk_id)?;
        let record = ctx
            .engine
            .documents()
            .add_document_chunk(input.into())
            .await?;
        Ok(json!({ "chunk": to_output(&record)? }))
    }
}

/// Splits a whole document into chunks and indexes them.
#[derive(Debug, Default)]
pub struct IndexDocumentTool;

#[derive(Debug, Deserialize)]
struct IndexDocumentArgs {
    #[serde(alias = "documentId")]
    document_id: String,
    content: String,
    #[serde(default, alias = "filePath")]
    file_path: String,
    #[serde(default, alias = "fileType")]
    file_type: String,
    #[serde(default)]
    title: String,
}

#[async_trait]
impl Tool for IndexDocumentTool {
    fn name(&self) -> &str {
        "index_document"
    }

    fn description(&self) -> &str {
        "Split a document into overlapping word windows and index every chunk"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "documentId": { "type": "string" },
                "content": { "type": "string" },
                "filePath": { "type": "string" },
                "fileType": { "type": "string" },
                "title": { "type": "string" }
            },
            "required": ["documentId", "content"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: IndexDocumentArgs = parse_args(args)?;
        require_text("documentId", &input.document_id)?;
        let records = ctx
            .engine
            .documents()
            .index_document(IndexDocument {
                document_id: input.document_id.clone(),
                content: input.content,
                file_path: input.file_path,
                file_type: input.file_type,
                title: input.title,
            })
            .await?;
        info!(
            "document indexed via tool (document_id={}, chunks={})",
            input.document_id,
            records.len()
        );
        Ok(json!({ "documentId": input.document_id, "chunks": records.len() }))
    }
}

/// Similarity search over document chunks.
#[derive(Debug, Default)]
pub struct SearchDocumentsTool;

#[derive(Debug, Deserialize)]
struct SearchDocumentsArgs {
    query: String,
    #[serde(default, alias = "fileTypes")]
    file_types: Vec<String>,
    #[serde(default, alias = "maxResults")]
    max_results: Option<usize>,
}

#[async_trait]
impl Tool for SearchDocumentsTool {
    fn name(&self) -> &str {
        "search_documents"
    }

    fn description(&self) -> &str {
        "Find document chunks similar to a query, optionally limited to file types"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "fileTypes": { "type": "array", "items": { "type": "string" } },
                "maxResults": { "type": "integer", "minimum": 1 }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: SearchDocumentsArgs = parse_args(args)?;
        let hits = ctx
            .engine
            .documents()
            .search_documents(
                &input.query,
                DocumentSearchOptions {
                    file_types: input.file_types,
                    max_results: input.max_results,
                },
            )
            .await;
        Ok(json!({ "documents": to_output(&hits)? }))
    }
}

/// Every chunk of one document in position order.
#[derive(Debug, Default)]
pub struct GetDocumentChunksTool;

#[derive(Debug, Deserialize)]
struct GetDocumentChunksArgs {
    #[serde(alias = "documentId")]
    document_id: String,
}

#[async_trait]
impl Tool for GetDocumentChunksTool {
    fn name(&self) -> &str {
        "get_document_chunks"
    }

    fn description(&self) -> &str {
        "Return all chunks of a document ordered by position"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "documentId": { "type": "string" } },
            "required": ["documentId"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: GetDocumentChunksArgs = parse_args(args)?;
        let chunks = ctx
            .engine
            .documents()
            .get_document_chunks(&input.document_id)
            .await;
        Ok(json!({ "documentId": input.document_id, "chunks": to_output(&chunks)? }))
    }
}

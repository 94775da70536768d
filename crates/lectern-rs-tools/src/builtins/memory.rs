//! Memory tools: add, search, stats.

use crate::builtins::utils::{parse_args, require_text, to_output};
use crate::{Tool, ToolContext, ToolError};
use async_trait::async_trait;
use lectern_rs_memory::NewMemory;
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Stores a new memory.
#[derive(Debug, Default)]
pub struct AddMemoryTool;

#[derive(Debug, Deserialize)]
struct AddMemoryArgs {
    content: String,
    #[serde(rename = "type", alias = "memoryType", alias = "memory_type")]
    memory_type: String,
    #[serde(default)]
    importance: Option<f32>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    context: Vec<String>,
}

#[async_trait]
impl Tool for AddMemoryTool {
    fn name(&self) -> &str {
        "add_memory"
    }

    fn description(&self) -> &str {
        "Store a memory with a type, optional importance (0-1) and tags"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": { "type": "string", "description": "Text to remember." },
                "type": { "type": "string", "description": "Kind of memory, e.g. fact or preference." },
                "importance": { "type": "number", "minimum": 0, "maximum": 1 },
                "tags": { "type": "array", "items": { "type": "string" } },
                "context": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["content", "type"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: AddMemoryArgs = parse_args(args)?;
        require_text("content", &input.content)?;
        let mut memory = NewMemory::new(input.content, input.memory_type)
            .with_tags(input.tags)
            .with_context(input.context);
        if let Some(importance) = input.importance {
            memory = memory.with_importance(importance);
        }
        let record = ctx.engine.memories().add_memory(memory).await?;
        info!("memory added via tool (id={})", record.id);
        Ok(json!({ "memory": to_output(&record)? }))
    }
}

/// Similarity search over memories.
#[derive(Debug, Default)]
pub struct SearchMemoriesTool;

#[derive(Debug, Deserialize)]
struct SearchMemoriesArgs {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
}

#[async_trait]
impl Tool for SearchMemoriesTool {
    fn name(&self) -> &str {
        "search_memories"
    }

    fn description(&self) -> &str {
        "Find the memories most similar to a query"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "limit": { "type": "integer", "minimum": 1, "default": DEFAULT_SEARCH_LIMIT }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: SearchMemoriesArgs = parse_args(args)?;
        let limit = input.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let hits = ctx.engine.memories().search(&input.query, limit).await;
        Ok(json!({ "memories": to_output(&hits)? }))
    }
}

/// Row counts for every table.
#[derive(Debug, Default)]
pub struct GetMemoryStatsTool;

#[async_trait]
impl Tool for GetMemoryStatsTool {
    fn name(&self) -> &str {
        "get_memory_stats"
    }

    fn description(&self) -> &str {
        "Count stored memories, patterns, insights and document chunks"
    }

    fn args_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, ctx: &ToolContext, _args: Value) -> Result<Value, ToolError> {
        let stats = ctx.engine.memories().get_stats().await;
        to_output(&stats)
    }
}

#[cfg(test)]
mod tests {
    use super::AddMemoryTool;
    use crate::{Tool, ToolContext, ToolError};
    use lectern_rs_memory::{EngineOptions, MemoryEngine};
    use serde_json::json;
    use std::sync::Arc;

    fn context(temp: &tempfile::TempDir) -> ToolContext {
        let mut options = EngineOptions::new(temp.path());
        options.dimensions = 8;
        ToolContext::new(Arc::new(MemoryEngine::new(options)))
    }

    #[tokio::test]
    async fn add_memory_rejects_blank_content() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = AddMemoryTool
            .call(&context(&temp), json!({ "content": " ", "type": "fact" }))
            .await
            .expect_err("blank");
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn add_memory_accepts_camel_case_type() {
        let temp = tempfile::tempdir().expect("tempdir");
        let output = AddMemoryTool
            .call(
                &context(&temp),
                json!({ "content": "likes tea", "memoryType": "preference", "importance": 0.9 }),
            )
            .await
            .expect("add");
        assert_eq!(output["memory"]["type"], "preference");
        assert_eq!(output["memory"]["content"], "likes tea");
    }
}

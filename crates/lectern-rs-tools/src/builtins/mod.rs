//! Built-in tools, one per engine operation.

mod documents;
mod insights;
mod memory;
mod utils;

use crate::ToolRegistry;
use log::info;
use std::sync::Arc;

pub use documents::{
    AddDocumentChunkTool, GetDocumentChunksTool, IndexDocumentTool, SearchDocumentsTool,
};
pub use insights::{DismissInsightTool, GenerateInsightsTool, ListInsightsTool};
pub use memory::{AddMemoryTool, GetMemoryStatsTool, SearchMemoriesTool};

/// Register all built-in tools with the provided registry.
pub fn register_builtin_tools(registry: &ToolRegistry) {
    registry.register(Arc::new(AddMemoryTool));
    registry.register(Arc::new(SearchMemoriesTool));
    registry.register(Arc::new(GetMemoryStatsTool));
    registry.register(Arc::new(GenerateInsightsTool));
    registry.register(Arc::new(ListInsightsTool));
    registry.register(Arc::new(DismissInsightTool));
    registry.register(Arc::new(AddDocumentChunkTool));
    registry.register(Arc::new(IndexDocumentTool));
    registry.register(Arc::new(SearchDocumentsTool));
    registry.register(Arc::new(GetDocumentChunksTool));
    info!("registered built-in tools");
}

/// Build a registry pre-populated with built-in tools.
pub fn builtin_tool_registry() -> ToolRegistry {
    let registry = ToolRegistry::new();
    register_builtin_tools(&registry);
    registry
}

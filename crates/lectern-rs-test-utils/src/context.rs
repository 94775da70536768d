use lectern_rs_memory::MemoryEngine;
use lectern_rs_tools::ToolContext;
use std::sync::Arc;

/// Tool context over `engine` with no output policy.
pub fn base_tool_context(engine: Arc<MemoryEngine>) -> ToolContext {
    ToolContext {
        engine,
        output_policy: None,
    }
}

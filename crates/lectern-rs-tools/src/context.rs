//! Per-call context for tools.

use crate::output_policy::ToolOutputPolicy;
use lectern_rs_memory::MemoryEngine;
use std::sync::Arc;

/// Shared state handed to every tool call.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Engine the tools operate on.
    pub engine: Arc<MemoryEngine>,
    /// Applied to tool output by [`crate::ToolRegistry::dispatch`] when set.
    pub output_policy: Option<ToolOutputPolicy>,
}

impl ToolContext {
    pub fn new(engine: Arc<MemoryEngine>) -> Self {
        Self {
            engine,
            output_policy: None,
        }
    }

    pub fn with_output_policy(mut self, policy: ToolOutputPolicy) -> Self {
        self.output_policy = Some(policy);
        self
    }
}

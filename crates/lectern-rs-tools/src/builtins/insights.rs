//! Insight tools: generate, list, dismiss.

use crate::builtins::utils::{parse_args, require_text, to_output};
use crate::{Tool, ToolContext, ToolError};
use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

/// Runs the insight rules and stores what they produce.
#[derive(Debug, Default)]
pub struct GenerateInsightsTool;

#[async_trait]
impl Tool for GenerateInsightsTool {
    fn name(&self) -> &str {
        "generate_insights"
    }

    fn description(&self) -> &str {
        "Derive insights from stored memories and recurring patterns"
    }

    fn args_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, ctx: &ToolContext, _args: Value) -> Result<Value, ToolError> {
        let insights = ctx.engine.insights().generate_insights().await?;
        info!("insights generated via tool (count={})", insights.len());
        Ok(json!({ "insights": to_output(&insights)? }))
    }
}

/// Lists insights that have not been dismissed.
#[derive(Debug, Default)]
pub struct ListInsightsTool;

#[async_trait]
impl Tool for ListInsightsTool {
    fn name(&self) -> &str {
        "list_insights"
    }

    fn description(&self) -> &str {
        "List insights that have not been dismissed"
    }

    fn args_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, ctx: &ToolContext, _args: Value) -> Result<Value, ToolError> {
        let insights = ctx.engine.insights().list_insights().await;
        Ok(json!({ "insights": to_output(&insights)? }))
    }
}

/// Hides an insight from future listings.
#[derive(Debug, Default)]
pub struct DismissInsightTool;

#[derive(Debug, Deserialize)]
struct DismissInsightArgs {
    #[serde(alias = "insightId", alias = "insight_id")]
    id: String,
}

#[async_trait]
impl Tool for DismissInsightTool {
    fn name(&self) -> &str {
        "dismiss_insight"
    }

    fn description(&self) -> &str {
        "Dismiss an insight by id"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: DismissInsightArgs = parse_args(args)?;
        require_text("id", &input.id)?;
        let dismissed = ctx.engine.insights().dismiss_insight(&input.id).await?;
        Ok(json!({ "id": input.id, "dismissed": dismissed }))
    }
}

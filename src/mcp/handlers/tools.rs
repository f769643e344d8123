//! `tools/list` and `tools/call`.
//!
//! A failing tool is reported inside the result with `isError: true` so the
//! client sees the remote error text. Malformed calls (unknown tool, missing
//! argument) are protocol errors.

use serde_json::{json, Value};

use crate::context::InvocationContext;
use crate::mcp::router::{str_field, ServerState};
use crate::tools::ToolOutput;
use crate::types::{Error, Result};

pub async fn handle(state: &ServerState, method: &str, params: Value) -> Result<Value> {
    match method {
        "tools/list" => {
            let tools: Vec<Value> = state
                .registry
                .tools()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "inputSchema": t.input_schema(),
                    })
                })
                .collect();
            Ok(json!({ "tools": tools }))
        }

        "tools/call" => {
            let name = str_field(&params, "name")?;
            let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

            let tool = state
                .registry
                .get(&name)
                .ok_or_else(|| Error::validation(format!("Unknown tool: {}", name)))?;

            let ctx = InvocationContext::new(state.lifespan.credential()?, state.arm.clone());
            tracing::info!(tool = %name, request_id = %ctx.request_id(), "Tool invoked");

            match tool.invoke(&ctx, arguments).await {
                Ok(output) => {
                    tracing::debug!(tool = %name, items = output.len(), "Tool completed");
                    Ok(json!({ "content": content(&output)?, "isError": false }))
                }
                Err(e @ Error::Validation(_)) => Err(e),
                Err(e) => {
                    tracing::warn!(tool = %name, request_id = %ctx.request_id(), error = %e, "Tool failed");
                    Ok(json!({
                        "content": [{ "type": "text", "text": e.to_string() }],
                        "isError": true,
                    }))
                }
            }
        }

        _ => Err(Error::UnknownMethod(method.to_string())),
    }
}

/// One text item for a single resource, one per element for a sequence.
fn content(output: &ToolOutput) -> Result<Vec<Value>> {
    let text = |value: &Value| -> Result<Value> {
        Ok(json!({ "type": "text", "text": serde_json::to_string(value)? }))
    };
    match output {
        ToolOutput::Single(value) => Ok(vec![text(value)?]),
        ToolOutput::Sequence(items) => items.iter().map(text).collect(),
    }
}

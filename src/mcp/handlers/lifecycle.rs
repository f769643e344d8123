//! `initialize` and `ping`.

use serde_json::{json, Value};

use crate::mcp::router::ServerState;
use crate::mcp::MCP_VERSION;
use crate::types::{Error, Result};

pub fn handle(state: &ServerState, method: &str, params: Value) -> Result<Value> {
    match method {
        "initialize" => {
            if let Some(requested) = params.get("protocolVersion").and_then(Value::as_str) {
                if requested != MCP_VERSION {
                    tracing::debug!(requested, supported = MCP_VERSION, "Client requested another protocol version");
                }
            }

            let mut result = json!({
                "protocolVersion": MCP_VERSION,
                "capabilities": {
                    "tools": { "listChanged": false },
                    "prompts": { "listChanged": false },
                    "resources": { "subscribe": false, "listChanged": false },
                },
                "serverInfo": {
                    "name": state.info.name,
                    "version": state.info.version,
                },
            });
            if let Some(instructions) = state.registry.instructions() {
                result["instructions"] = Value::String(instructions);
            }
            Ok(result)
        }

        "ping" => Ok(json!({})),

        _ => Err(Error::UnknownMethod(method.to_string())),
    }
}

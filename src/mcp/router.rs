//! Routes MCP methods to their handlers.

use serde_json::Value;
use std::sync::Arc;

use crate::credential::CredentialLifespan;
use crate::mcp::handlers;
use crate::tools::ToolRegistry;
use crate::types::{ArmConfig, Error, Result, ServerConfig};

/// Everything a request handler may read. Shared by every in-flight call.
#[derive(Debug)]
pub struct ServerState {
    pub registry: ToolRegistry,
    pub lifespan: Arc<CredentialLifespan>,
    pub arm: Arc<ArmConfig>,
    pub info: ServerConfig,
}

/// Route a request by method name.
pub async fn route_request(state: &ServerState, method: &str, params: Value) -> Result<Value> {
    match method {
        "initialize" | "ping" => handlers::lifecycle::handle(state, method, params),
        "tools/list" | "tools/call" => handlers::tools::handle(state, method, params).await,
        "prompts/list" | "prompts/get" => handlers::prompts::handle(state, method, params),
        "resources/list" | "resources/read" | "resources/templates/list" => {
            handlers::resources::handle(state, method, params)
        }
        _ => Err(Error::UnknownMethod(method.to_string())),
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

pub fn str_field(params: &Value, key: &str) -> Result<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| Error::validation(format!("Missing required field: {}", key)))
}

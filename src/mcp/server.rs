//! MCP stdio server: read loop, per-call tasks and the single writer.

use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tokio::task::{AbortHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::credential::CredentialLifespan;
use crate::mcp::codec::{decode_line, write_message, JsonRpcRequest, JsonRpcResponse};
use crate::mcp::router::{route_request, ServerState};
use crate::tools::ToolRegistry;
use crate::types::{ArmConfig, Result, ServerConfig, INTERNAL_ERROR, INVALID_REQUEST};

/// Why [`McpServer::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Input reached EOF and every in-flight call finished.
    InputClosed,
    /// The shutdown token was cancelled; in-flight calls were aborted.
    Shutdown,
}

/// MCP server over a line-oriented byte stream (stdin/stdout in production).
///
/// `tools/call` requests each run in their own task so one slow ARM call
/// never blocks another; every other method is answered inline. All output
/// goes through the run loop, which is the only writer.
#[derive(Debug)]
pub struct McpServer {
    state: Arc<ServerState>,
    cancel: CancellationToken,
}

impl McpServer {
    pub fn new(
        registry: ToolRegistry,
        lifespan: Arc<CredentialLifespan>,
        arm: ArmConfig,
        info: ServerConfig,
    ) -> Self {
        Self {
            state: Arc::new(ServerState {
                registry,
                lifespan,
                arm: Arc::new(arm),
                info,
            }),
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops [`run`](Self::run) and aborts in-flight calls.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Serve until `input` reaches EOF (after in-flight calls finish) or
    /// shutdown is requested (in-flight calls are aborted).
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<StopReason>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut tasks: JoinSet<(String, JsonRpcResponse)> = JoinSet::new();
        // Running `tools/call` tasks keyed by serialized request id.
        let mut in_flight: HashMap<String, AbortHandle> = HashMap::new();
        let mut input_open = true;

        tracing::info!(tools = self.state.registry.len(), "MCP server ready");

        loop {
            if !input_open && tasks.is_empty() {
                return Ok(StopReason::InputClosed);
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!(in_flight = tasks.len(), "MCP server shutting down");
                    tasks.abort_all();
                    return Ok(StopReason::Shutdown);
                }

                line = lines.next_line(), if input_open => {
                    let Some(line) = line? else {
                        tracing::debug!(in_flight = tasks.len(), "Input closed");
                        input_open = false;
                        continue;
                    };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let request = match decode_line(line) {
                        Ok(request) => request,
                        Err(response) => {
                            write_message(&mut output, &response).await?;
                            continue;
                        }
                    };

                    if let Some(response) = self.dispatch(request, &mut tasks, &mut in_flight).await {
                        write_message(&mut output, &response).await?;
                    }
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    match joined {
                        Ok((key, response)) => {
                            in_flight.remove(&key);
                            write_message(&mut output, &response).await?;
                        }
                        // Aborted through notifications/cancelled; no response is owed.
                        Err(e) if e.is_cancelled() => {}
                        Err(e) => tracing::error!(error = %e, "Tool task failed to join"),
                    }
                }
            }
        }
    }

    /// Handle one decoded message. Returns the response to write now, if any.
    async fn dispatch(
        &self,
        request: JsonRpcRequest,
        tasks: &mut JoinSet<(String, JsonRpcResponse)>,
        in_flight: &mut HashMap<String, AbortHandle>,
    ) -> Option<JsonRpcResponse> {
        let JsonRpcRequest {
            method, params, id, ..
        } = request;
        let params = params.unwrap_or(Value::Null);

        let Some(id) = id else {
            self.notify(&method, &params, in_flight);
            return None;
        };
        tracing::debug!(%method, %id, "Request received");

        if method != "tools/call" {
            return Some(match route_request(&self.state, &method, params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => JsonRpcResponse::from_error(id, &e),
            });
        }

        let key = id.to_string();
        if in_flight.contains_key(&key) {
            return Some(JsonRpcResponse::failure(
                id,
                INVALID_REQUEST,
                format!("Request id {} is already in flight", key),
            ));
        }
        let state = Arc::clone(&self.state);
        let task_key = key.clone();
        let handle = tasks.spawn(async move {
            let call = route_request(&state, "tools/call", params);
            let response = match AssertUnwindSafe(call).catch_unwind().await {
                Ok(Ok(result)) => JsonRpcResponse::success(id, result),
                Ok(Err(e)) => JsonRpcResponse::from_error(id, &e),
                Err(_) => JsonRpcResponse::failure(id, INTERNAL_ERROR, "tool handler panicked"),
            };
            (task_key, response)
        });
        in_flight.insert(key, handle);
        None
    }

    fn notify(&self, method: &str, params: &Value, in_flight: &mut HashMap<String, AbortHandle>) {
        match method {
            "notifications/cancelled" => {
                let Some(request_id) = params.get("requestId") else {
                    return;
                };
                let key = request_id.to_string();
                match in_flight.remove(&key) {
                    Some(handle) => {
                        handle.abort();
                        tracing::info!(request_id = %key, "Tool call cancelled");
                    }
                    None => tracing::debug!(request_id = %key, "Cancellation for unknown request"),
                }
            }
            "notifications/initialized" => tracing::debug!("Client initialized"),
            other => tracing::debug!(method = other, "Ignoring notification"),
        }
    }
}

//! Model Context Protocol over stdio.
//!
//! Line-delimited JSON-RPC 2.0 on stdin/stdout. Logs never touch stdout.

pub mod codec;
pub mod handlers;
pub mod router;
pub mod server;

pub use server::{McpServer, StopReason};

/// Protocol revision implemented by this server.
pub const MCP_VERSION: &str = "2024-11-05";

//! # Azure Resource MCP
//!
//! An MCP server that exposes read-only Azure Resource Manager lookups as
//! tools for LLM clients:
//! - one process-wide credential with an explicit open/close lifespan
//! - independently authored tool groups merged into one registry
//! - a short-lived ARM client per tool invocation
//! - JSON-RPC 2.0 over stdio
//!
//! ## Architecture
//!
//! ```text
//!   stdin ──► McpServer ──► router ──► ToolRegistry ──► ToolDescriptor
//!                │                                          │
//!                │                            InvocationContext (shared credential)
//!                │                                          │
//!   stdout ◄─────┘ (single writer)                    ArmClient ──► management.azure.com
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod arm;
pub mod context;
pub mod credential;
pub mod groups;
pub mod mcp;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;
pub mod validation;

pub use types::{Config, Error, Result};

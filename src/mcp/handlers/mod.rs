//! MCP method handlers, one module per capability.

pub mod lifecycle;
pub mod prompts;
pub mod resources;
pub mod tools;

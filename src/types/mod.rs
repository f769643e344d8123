//! Core types for the Azure MCP server.
//!
//! - **IDs**: Strongly-typed identifiers (SubscriptionId, RequestId, etc.)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Environment-driven configuration for ARM, identity and logging

mod config;
mod errors;
mod ids;

pub use config::{
    ArmConfig, Config, IdentityConfig, ObservabilityConfig, ServerConfig,
    DEFAULT_AUTHORITY_HOST, DEFAULT_RESOURCE_MANAGER_ENDPOINT,
};
pub use errors::{
    Error, Result, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
    RESOURCE_NOT_FOUND,
};
pub use ids::{RequestId, ResourceGroupName, SubscriptionId};

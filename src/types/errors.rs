//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

// JSON-RPC 2.0 error codes.
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

// MCP-specific codes.
pub const RESOURCE_NOT_FOUND: i64 = -32002;

/// Main error enum for the Azure MCP server.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing parameters (map to INVALID_PARAMS).
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource, prompt or URI not found locally.
    #[error("not found: {0}")]
    NotFound(String),

    /// Unknown protocol method.
    #[error("method not found: {0}")]
    UnknownMethod(String),

    /// Two tool groups declared the same tool name.
    #[error("tool '{tool}' declared by both '{first_group}' and '{second_group}'")]
    ToolConflict {
        tool: String,
        first_group: String,
        second_group: String,
    },

    /// Invalid lifespan state transition.
    #[error("state transition error: {0}")]
    StateTransition(String),

    /// Identity resolution or token acquisition failure.
    #[error("credential error: {0}")]
    Credential(String),

    /// Error response returned by the Azure management API.
    #[error("azure api error ({status} {code}): {message}")]
    Arm {
        status: u16,
        code: String,
        message: String,
    },

    /// Transport errors from the HTTP client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to a JSON-RPC error code.
    pub fn to_jsonrpc_code(&self) -> i64 {
        match self {
            Error::Validation(_) => INVALID_PARAMS,
            Error::NotFound(_) => RESOURCE_NOT_FOUND,
            Error::UnknownMethod(_) => METHOD_NOT_FOUND,
            Error::Serialization(_) => INVALID_PARAMS,
            Error::ToolConflict { .. }
            | Error::StateTransition(_)
            | Error::Credential(_)
            | Error::Arm { .. }
            | Error::Http(_)
            | Error::Config(_)
            | Error::Internal(_)
            | Error::Io(_) => INTERNAL_ERROR,
        }
    }

    /// True when the remote API reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Arm { status, .. } => *status == 404,
            Error::NotFound(_) => true,
            _ => false,
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn state_transition(msg: impl Into<String>) -> Self {
        Self::StateTransition(msg.into())
    }

    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

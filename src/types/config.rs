//! Configuration structures.
//!
//! Configuration is loaded from environment variables only; there is no
//! config file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::tools::ConflictPolicy;
use crate::types::{Error, Result};

/// Public-cloud ARM endpoint.
pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com";

/// Public-cloud Entra ID authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Azure Resource Manager configuration.
    #[serde(default)]
    pub arm: ArmConfig,

    /// Identity resolution configuration.
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported in `initialize`.
    pub name: String,

    /// Version reported in `initialize`.
    pub version: String,

    /// How duplicate tool names across groups are resolved.
    pub conflict_policy: ConflictPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Azure resource rest api MCP server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            conflict_policy: ConflictPolicy::Reject,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ObservabilityConfig {
    /// Enable JSON log formatting.
    pub json_logs: bool,
}

/// Azure Resource Manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmConfig {
    /// Base URL of the management API.
    pub endpoint: String,

    /// Token audience. Defaults to the endpoint when unset.
    pub audience: Option<String>,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string(),
            audience: None,
        }
    }
}

impl ArmConfig {
    /// Create a config pointing at an explicit endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            audience: None,
        }
    }

    /// OAuth2 scope requested for management API tokens.
    pub fn scope(&self) -> String {
        let audience = self.audience.as_deref().unwrap_or(&self.endpoint);
        format!("{}/.default", audience.trim_end_matches('/'))
    }
}

/// Identity resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Entra ID authority host used by the client-secret flow.
    pub authority_host: String,

    /// Cached tokens are refreshed once they are this close to expiry.
    #[serde(with = "humantime_serde")]
    pub token_refresh_skew: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            token_refresh_skew: Duration::from_secs(300),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get("AZURE_RESOURCE_MANAGER_ENDPOINT") {
            config.arm.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        config.arm.audience = get("AZURE_RESOURCE_MANAGER_AUDIENCE");

        if let Some(host) = get("AZURE_AUTHORITY_HOST") {
            config.identity.authority_host = host.trim_end_matches('/').to_string();
        }
        if let Some(skew) = get("AZURE_MCP_TOKEN_REFRESH_SKEW") {
            config.identity.token_refresh_skew = humantime::parse_duration(&skew)
                .map_err(|e| {
                    Error::config(format!("AZURE_MCP_TOKEN_REFRESH_SKEW '{}': {}", skew, e))
                })?;
        }

        if let Some(policy) = get("AZURE_MCP_CONFLICT_POLICY") {
            config.server.conflict_policy = policy.parse().map_err(Error::config)?;
        }
        if let Some(format) = get("AZURE_MCP_LOG_FORMAT") {
            config.observability.json_logs = format.eq_ignore_ascii_case("json");
        }

        Ok(config)
    }
}

//! Credential lifecycle: one Azure identity per server process.
//!
//! The credential is resolved once at startup from the ambient environment,
//! shared read-only by every tool invocation through [`InvocationContext`],
//! and released exactly once on shutdown by [`CredentialLifespan`].
//!
//! [`InvocationContext`]: crate::context::InvocationContext

pub mod azure_cli;
pub mod chain;
pub mod client_secret;
pub mod lifespan;
pub mod managed_identity;
pub mod token;

use async_trait::async_trait;

use crate::types::Result;

pub use azure_cli::AzureCliCredential;
pub use chain::DefaultAzureCredential;
pub use client_secret::ClientSecretCredential;
pub use lifespan::{run_with_credential, CredentialLifespan, LifespanState};
pub use managed_identity::ManagedIdentityCredential;
pub use token::{AccessToken, TokenCache};

/// Source of bearer tokens for the management API.
///
/// Implementations must be safe to share across concurrent invocations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Get a token for a single OAuth2 scope (e.g. `https://management.azure.com/.default`).
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;

    /// Release any held resources. Called once by the lifespan on shutdown.
    async fn close(&self) {}
}

/// Convert a `.default` scope into the v1 `resource` form used by managed
/// identity and the Azure CLI.
pub(crate) fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}

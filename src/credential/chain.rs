//! Ambient identity resolution.
//!
//! Sources are checked in a fixed order and the first one that is configured
//! in the environment is used for the lifetime of the process:
//! 1. service principal (`AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`)
//! 2. managed identity (`IDENTITY_ENDPOINT`, `IDENTITY_HEADER`)
//! 3. Azure CLI (`az` on `PATH`)

use async_trait::async_trait;
use std::ffi::OsString;

use super::{
    AccessToken, AzureCliCredential, ClientSecretCredential, ManagedIdentityCredential,
    TokenCredential,
};
use crate::types::{Error, IdentityConfig, Result};

pub struct DefaultAzureCredential {
    source: &'static str,
    inner: Box<dyn TokenCredential>,
}

impl std::fmt::Debug for DefaultAzureCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultAzureCredential")
            .field("source", &self.source)
            .finish()
    }
}

impl DefaultAzureCredential {
    /// Resolve the credential from the process environment.
    pub fn from_env(config: &IdentityConfig) -> Result<Self> {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    /// Resolve the credential from an arbitrary key lookup.
    pub fn from_lookup<F>(config: &IdentityConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            get("AZURE_TENANT_ID"),
            get("AZURE_CLIENT_ID"),
            get("AZURE_CLIENT_SECRET"),
        ) {
            let credential = ClientSecretCredential::new(
                &config.authority_host,
                tenant_id,
                client_id,
                client_secret,
                config.token_refresh_skew,
            )?;
            return Ok(Self::with_source("environment", Box::new(credential)));
        }

        if let (Some(endpoint), Some(header)) = (get("IDENTITY_ENDPOINT"), get("IDENTITY_HEADER")) {
            let credential = ManagedIdentityCredential::new(
                endpoint,
                header,
                get("AZURE_CLIENT_ID"),
                config.token_refresh_skew,
            )?;
            return Ok(Self::with_source("managed_identity", Box::new(credential)));
        }

        if let Some(program) = AzureCliCredential::find_program(get("PATH").map(OsString::from)) {
            let credential = AzureCliCredential::new(program, config.token_refresh_skew);
            return Ok(Self::with_source("azure_cli", Box::new(credential)));
        }

        Err(Error::credential(
            "no ambient Azure identity found: set AZURE_TENANT_ID, AZURE_CLIENT_ID and \
             AZURE_CLIENT_SECRET, run on a host with managed identity, or sign in with `az login`",
        ))
    }

    fn with_source(source: &'static str, inner: Box<dyn TokenCredential>) -> Self {
        tracing::info!(source, "Resolved Azure credential");
        Self { source, inner }
    }

    /// Which identity source was selected.
    pub fn source(&self) -> &'static str {
        self.source
    }
}

#[async_trait]
impl TokenCredential for DefaultAzureCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        self.inner.get_token(scope).await
    }

    async fn close(&self) {
        self.inner.close().await;
    }
}

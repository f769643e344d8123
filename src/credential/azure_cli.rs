//! Azure CLI credential: reuses the developer's `az login` session.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use super::{scope_to_resource, AccessToken, TokenCache, TokenCredential};
use crate::types::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    #[serde(default)]
    expires_on: Option<String>,
    /// Epoch seconds; only emitted by newer CLI versions.
    #[serde(default, rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

#[derive(Debug)]
pub struct AzureCliCredential {
    program: PathBuf,
    cache: TokenCache,
}

impl AzureCliCredential {
    pub fn new(program: impl Into<PathBuf>, refresh_skew: Duration) -> Self {
        Self {
            program: program.into(),
            cache: TokenCache::new(refresh_skew),
        }
    }

    /// Locate the `az` executable on the given `PATH` value.
    pub fn find_program(path: Option<OsString>) -> Option<PathBuf> {
        let path = path?;
        let names: &[&str] = if cfg!(windows) {
            &["az.cmd", "az.exe"]
        } else {
            &["az"]
        };
        std::env::split_paths(&path)
            .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
            .find(|candidate| is_file(candidate))
    }

    async fn request_token(&self, scope: &str) -> Result<AccessToken> {
        let output = Command::new(&self.program)
            .args(["account", "get-access-token", "--output", "json", "--resource"])
            .arg(scope_to_resource(scope))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::credential(format!("failed to run Azure CLI: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::credential(format!(
                "Azure CLI token request failed: {}",
                stderr.trim()
            )));
        }

        parse_cli_token(&output.stdout)
    }
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

fn parse_cli_token(stdout: &[u8]) -> Result<AccessToken> {
    let token: CliToken = serde_json::from_slice(stdout)?;

    let expires_on = match (token.expires_on_epoch, token.expires_on.as_deref()) {
        (Some(secs), _) => DateTime::from_timestamp(secs, 0),
        (None, Some(local)) => parse_local_timestamp(local),
        (None, None) => None,
    }
    .ok_or_else(|| Error::credential("Azure CLI token response has no usable expiry"))?;

    Ok(AccessToken::new(token.access_token, expires_on))
}

/// Older CLI versions report `expiresOn` in local time without an offset.
fn parse_local_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        self.cache
            .get_or_fetch(scope, || self.request_token(scope))
            .await
    }

    async fn close(&self) {
        self.cache.clear().await;
    }
}

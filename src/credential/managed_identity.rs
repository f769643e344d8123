//! Managed identity credential for App Service / Functions style hosts.
//!
//! The host injects `IDENTITY_ENDPOINT` and `IDENTITY_HEADER`; tokens are
//! requested from that local endpoint with the secret header attached.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use super::{scope_to_resource, AccessToken, TokenCache, TokenCredential};
use crate::types::{Error, Result};

const API_VERSION: &str = "2019-08-01";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_on: Value,
}

pub struct ManagedIdentityCredential {
    http: reqwest::Client,
    endpoint: String,
    identity_header: String,
    client_id: Option<String>,
    cache: TokenCache,
}

impl fmt::Debug for ManagedIdentityCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedIdentityCredential")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl ManagedIdentityCredential {
    pub fn new(
        endpoint: impl Into<String>,
        identity_header: impl Into<String>,
        client_id: Option<String>,
        refresh_skew: Duration,
    ) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            endpoint: endpoint.into(),
            identity_header: identity_header.into(),
            client_id,
            cache: TokenCache::new(refresh_skew),
        })
    }

    async fn request_token(&self, scope: &str) -> Result<AccessToken> {
        let mut query = vec![
            ("api-version", API_VERSION),
            ("resource", scope_to_resource(scope)),
        ];
        if let Some(client_id) = self.client_id.as_deref() {
            query.push(("client_id", client_id));
        }

        let response = self
            .http
            .get(&self.endpoint)
            .header("X-IDENTITY-HEADER", &self.identity_header)
            .query(&query)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::credential(format!(
                "managed identity token request failed ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok(AccessToken::new(
            token.access_token,
            parse_expires_on(&token.expires_on)?,
        ))
    }
}

/// `expires_on` is epoch seconds, sent as either a string or a number.
fn parse_expires_on(value: &Value) -> Result<DateTime<Utc>> {
    let secs = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::credential(format!("invalid expires_on in token response: {}", value)))?;

    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Error::credential(format!("expires_on out of range: {}", secs)))
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        self.cache
            .get_or_fetch(scope, || self.request_token(scope))
            .await
    }

    async fn close(&self) {
        self.cache.clear().await;
    }
}

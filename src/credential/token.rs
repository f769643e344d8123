//! Access tokens and the per-credential token cache.

use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::types::Result;

/// A bearer token for the management API.
///
/// The token value is masked in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// True once the token is within `skew` of its expiry.
    pub fn is_expired(&self, skew: Duration) -> bool {
        let skew = chrono::Duration::from_std(skew).unwrap_or_else(|_| chrono::Duration::zero());
        Utc::now() >= self.expires_on - skew
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &mask(&self.token))
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

fn mask(token: &str) -> String {
    if token.len() <= 8 {
        "***".to_string()
    } else {
        format!("{}***", token.chars().take(4).collect::<String>())
    }
}

/// Caches the last token issued by a credential.
///
/// This is a cache, not a retry layer: a failed fetch is returned to the
/// caller and the next request fetches again.
#[derive(Debug)]
pub struct TokenCache {
    refresh_skew: Duration,
    slot: Mutex<Option<(String, AccessToken)>>,
}

impl TokenCache {
    pub fn new(refresh_skew: Duration) -> Self {
        Self {
            refresh_skew,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached token for `scope`, or fetch and cache a new one.
    pub async fn get_or_fetch<F, Fut>(&self, scope: &str, fetch: F) -> Result<AccessToken>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some((cached_scope, token)) = slot.as_ref() {
            if cached_scope == scope && !token.is_expired(self.refresh_skew) {
                return Ok(token.clone());
            }
        }

        let token = fetch().await?;
        tracing::debug!(scope, expires_on = %token.expires_on, "Access token refreshed");
        *slot = Some((scope.to_string(), token.clone()));
        Ok(token)
    }

    /// Drop the cached token.
    pub async fn clear(&self) {
        self.slot.lock().await.take();
    }
}

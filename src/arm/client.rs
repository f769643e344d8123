//! Scoped Azure Resource Manager client.
//!
//! One client is opened per tool invocation, performs a single logical read
//! (a GET, a drained paginated list, or a graph query) and is closed straight
//! after, whether the read succeeded or not.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, Response, Url};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::context::InvocationContext;
use crate::credential::TokenCredential;
use crate::types::{Error, RequestId, Result};

const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";

#[derive(Debug, Deserialize)]
struct ArmErrorEnvelope {
    error: ArmErrorBody,
}

#[derive(Debug, Deserialize)]
struct ArmErrorBody {
    code: String,
    message: String,
}

/// A page of a list operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    #[serde(default)]
    value: Vec<Value>,
    #[serde(default)]
    next_link: Option<String>,
}

pub struct ArmClient {
    http: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    base: Url,
    scope: String,
    user_agent: &'static str,
    request_id: RequestId,
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("base", &self.base.as_str())
            .field("user_agent", &self.user_agent)
            .field("request_id", &self.request_id)
            .finish()
    }
}

impl ArmClient {
    /// Open a client bound to the invocation's credential.
    pub fn open(ctx: &InvocationContext, user_agent: &'static str) -> Result<Self> {
        let base = Url::parse(&ctx.arm().endpoint).map_err(|e| {
            Error::config(format!("invalid ARM endpoint '{}': {}", ctx.arm().endpoint, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(Error::config(format!(
                "invalid ARM endpoint '{}'",
                ctx.arm().endpoint
            )));
        }

        let request_id = ctx.request_id().clone();
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            CLIENT_REQUEST_ID,
            HeaderValue::from_str(request_id.as_str())
                .map_err(|e| Error::internal(format!("invalid request id header: {}", e)))?,
        );

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        tracing::debug!(user_agent, request_id = %request_id, "ARM client opened");

        Ok(Self {
            http,
            credential: ctx.credential().clone(),
            base,
            scope: ctx.arm().scope(),
            user_agent,
            request_id,
        })
    }

    /// Build `{endpoint}/{segments...}?api-version=...`, percent-encoding each segment.
    pub fn url(&self, segments: &[&str], api_version: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config("ARM endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    /// GET a single resource.
    pub async fn get(&self, segments: &[&str], api_version: &str) -> Result<Value> {
        let url = self.url(segments, api_version)?;
        let response = self.send(Method::GET, url, None).await?;
        Ok(response.json().await?)
    }

    /// GET a collection and drain every `nextLink` page, preserving order.
    pub async fn list(&self, segments: &[&str], api_version: &str) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut next = Some(self.url(segments, api_version)?);
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let page: Page = self.send(Method::GET, url, None).await?.json().await?;
            pages += 1;
            items.extend(page.value);
            next = match page.next_link.filter(|link| !link.is_empty()) {
                Some(link) => Some(Url::parse(&link).map_err(|e| {
                    Error::internal(format!("invalid nextLink '{}': {}", link, e))
                })?),
                None => None,
            };
        }

        tracing::debug!(pages, items = items.len(), "ARM list drained");
        Ok(items)
    }

    /// POST a JSON body (used by read-only query APIs such as Resource Graph).
    pub async fn post(&self, segments: &[&str], api_version: &str, body: &Value) -> Result<Value> {
        let url = self.url(segments, api_version)?;
        let response = self.send(Method::POST, url, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// Release the client.
    pub fn close(self) {
        tracing::debug!(request_id = %self.request_id, "ARM client closed");
    }

    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Response> {
        let token = self.credential.get_token(&self.scope).await?;

        tracing::debug!(%method, path = url.path(), "ARM request");
        let mut request = self.http.request(method, url).bearer_auth(&token.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(error_from_response(response).await)
    }
}

/// Turn a non-success response into [`Error::Arm`], keeping ARM's own code
/// and message.
async fn error_from_response(response: Response) -> Error {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return Error::Http(e),
    };

    match serde_json::from_str::<ArmErrorEnvelope>(&body) {
        Ok(envelope) => Error::Arm {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => Error::Arm {
            status: status.as_u16(),
            code: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .replace(' ', ""),
            message: body,
        },
    }
}

//! Shared fixtures: an in-process fake of the Azure management and identity
//! endpoints, plus test credentials.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use azure_resource_mcp::context::InvocationContext;
use azure_resource_mcp::credential::{AccessToken, TokenCredential};
use azure_resource_mcp::types::{ArmConfig, Error, Result};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

pub const TENANT: &str = "tenant-1";
pub const IDENTITY_HEADER: &str = "identity-header-secret";

/// Names returned by the paginated resource list, in provider order.
pub const LISTED_RESOURCES: [&str; 5] = ["vm-a", "vm-b", "disk-a", "nic-a", "vnet-1"];
const PAGE_SIZE: usize = 2;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub user_agent: Option<String>,
    pub authorization: Option<String>,
    pub client_request_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct FakeAzureState {
    base: Mutex<String>,
    requests: Mutex<Vec<RecordedRequest>>,
    token_requests: AtomicUsize,
}

impl FakeAzureState {
    fn base(&self) -> String {
        self.base.lock().unwrap().clone()
    }

    fn record(&self, method: &str, headers: &HeaderMap, uri: &Uri) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            query: uri.query().unwrap_or_default().to_string(),
            user_agent: header("user-agent"),
            authorization: header("authorization"),
            client_request_id: header("x-ms-client-request-id"),
        });
    }
}

/// A fake ARM + Entra ID server bound to an ephemeral local port.
pub struct FakeAzure {
    pub base: String,
    state: Arc<FakeAzureState>,
    handle: JoinHandle<()>,
}

impl FakeAzure {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(FakeAzureState::default());
        *state.base.lock().unwrap() = base.clone();

        let app = Router::new()
            .route(
                "/subscriptions/{subscription}/resourceGroups/{group}/providers/Microsoft.Network/virtualNetworks/{name}",
                get(virtual_network),
            )
            .route(
                "/subscriptions/{subscription}/resourceGroups/{group}/providers/Microsoft.ContainerService/managedClusters/{name}",
                get(managed_cluster),
            )
            .route("/subscriptions/{subscription}/resourcegroups/{group}", get(resource_group))
            .route(
                "/subscriptions/{subscription}/resourceGroups/{group}/resources",
                get(resources_in_group),
            )
            .route("/providers/Microsoft.ResourceGraph/resources", post(resource_graph))
            .route("/tenant-1/oauth2/v2.0/token", post(client_secret_token))
            .route("/msi/token", get(managed_identity_token))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { base, state, handle }
    }

    /// ARM requests seen so far (identity requests excluded).
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn arm_config(&self) -> ArmConfig {
        ArmConfig::with_endpoint(self.base.clone())
    }

    pub fn context(&self, credential: Arc<dyn TokenCredential>) -> InvocationContext {
        InvocationContext::new(credential, Arc::new(self.arm_config()))
    }
}

impl Drop for FakeAzure {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn not_found(kind: &str, name: &str, group: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "ResourceNotFound",
                "message": format!(
                    "The Resource '{}/{}' under resource group '{}' was not found.",
                    kind, name, group
                ),
            }
        })),
    )
        .into_response()
}

async fn virtual_network(
    State(state): State<Arc<FakeAzureState>>,
    Path((subscription, group, name)): Path<(String, String, String)>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    state.record("GET", &headers, &uri);
    if name != "vnet-1" {
        return not_found("Microsoft.Network/virtualNetworks", &name, &group);
    }
    Json(json!({
        "id": format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/virtualNetworks/{}",
            subscription, group, name
        ),
        "name": name,
        "type": "Microsoft.Network/virtualNetworks",
        "location": "westus2",
        "etag": "W/\"00000000-0000-0000-0000-000000000000\"",
        "properties": {
            "provisioningState": "Succeeded",
            "resourceGuid": "5a7b9c2d-1111-2222-3333-444455556666",
            "addressSpace": { "addressPrefixes": ["10.0.0.0/16"] },
            "subnets": [],
        },
    }))
    .into_response()
}

async fn managed_cluster(
    State(state): State<Arc<FakeAzureState>>,
    Path((_subscription, group, name)): Path<(String, String, String)>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    state.record("GET", &headers, &uri);
    if name != "aks-1" {
        return not_found("Microsoft.ContainerService/managedClusters", &name, &group);
    }
    Json(json!({
        "name": name,
        "type": "Microsoft.ContainerService/managedClusters",
        "properties": {
            "provisioningState": "Succeeded",
            "kubernetesVersion": "1.30.3",
            "fqdn": "aks-1-dns.hcp.westus2.azmk8s.io",
        },
    }))
    .into_response()
}

async fn resource_group(
    State(state): State<Arc<FakeAzureState>>,
    Path((subscription, group)): Path<(String, String)>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    state.record("GET", &headers, &uri);
    Json(json!({
        "id": format!("/subscriptions/{}/resourceGroups/{}", subscription, group),
        "name": group,
        "type": "Microsoft.Resources/resourceGroups",
        "location": "westus2",
        "properties": { "provisioningState": "Succeeded" },
    }))
    .into_response()
}

async fn resources_in_group(
    State(state): State<Arc<FakeAzureState>>,
    Path((_subscription, group)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    state.record("GET", &headers, &uri);
    if group == "empty-rg" {
        return Json(json!({ "value": [] })).into_response();
    }

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let start = page * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(LISTED_RESOURCES.len());
    let value: Vec<Value> = LISTED_RESOURCES[start..end]
        .iter()
        .map(|name| json!({ "name": name, "type": "Microsoft.Compute/virtualMachines" }))
        .collect();

    let mut body = json!({ "value": value });
    if end < LISTED_RESOURCES.len() {
        body["nextLink"] = Value::String(format!(
            "{}{}?api-version=2022-09-01&page={}",
            state.base(),
            uri.path(),
            page + 1
        ));
    }
    Json(body).into_response()
}

async fn resource_graph(
    State(state): State<Arc<FakeAzureState>>,
    headers: HeaderMap,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    state.record("POST", &headers, &uri);
    if body["options"]["resultFormat"] != "objectArray" {
        return (StatusCode::BAD_REQUEST, "expected objectArray").into_response();
    }

    match body["options"]["$skipToken"].as_str() {
        None => Json(json!({
            "totalRecords": 3,
            "count": 2,
            "data": [{ "name": "row-1" }, { "name": "row-2" }],
            "$skipToken": "page-2",
        }))
        .into_response(),
        Some("page-2") => Json(json!({
            "totalRecords": 3,
            "count": 1,
            "data": [{ "name": "row-3" }],
        }))
        .into_response(),
        Some(other) => (StatusCode::BAD_REQUEST, format!("bad skip token {other}")).into_response(),
    }
}

async fn client_secret_token(
    State(state): State<Arc<FakeAzureState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let count = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    if form.get("client_secret").map(String::as_str) != Some("secret") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided.",
            })),
        )
            .into_response();
    }
    Json(json!({
        "token_type": "Bearer",
        "expires_in": 3599,
        "access_token": format!("secret-token-{count}"),
    }))
    .into_response()
}

async fn managed_identity_token(
    State(state): State<Arc<FakeAzureState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.token_requests.fetch_add(1, Ordering::SeqCst);
    let header_ok = headers
        .get("x-identity-header")
        .and_then(|v| v.to_str().ok())
        == Some(IDENTITY_HEADER);
    if !header_ok || params.get("api-version").map(String::as_str) != Some("2019-08-01") {
        return (StatusCode::BAD_REQUEST, "bad managed identity request").into_response();
    }
    let expires_on = (Utc::now() + ChronoDuration::hours(1)).timestamp();
    Json(json!({
        "access_token": format!("msi-token-for-{}", params.get("resource").cloned().unwrap_or_default()),
        "expires_on": expires_on.to_string(),
        "resource": params.get("resource"),
        "token_type": "Bearer",
    }))
    .into_response()
}

// =============================================================================
// Credentials
// =============================================================================

/// Hands out a fixed token and counts calls.
#[derive(Debug, Default)]
pub struct StaticCredential {
    token: String,
    pub gets: AtomicUsize,
    pub closes: AtomicUsize,
}

impl StaticCredential {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl TokenCredential for StaticCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new(self.token.clone(), Utc::now() + ChronoDuration::hours(1)))
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Always fails token acquisition.
#[derive(Debug, Default)]
pub struct FailingCredential;

#[async_trait]
impl TokenCredential for FailingCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        Err(Error::credential("no ambient Azure identity found"))
    }
}

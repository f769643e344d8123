//! `resources/list`, `resources/read` and `resources/templates/list`.

use serde_json::{json, Value};

use crate::mcp::router::{str_field, ServerState};
use crate::types::{Error, Result};

pub fn handle(state: &ServerState, method: &str, params: Value) -> Result<Value> {
    match method {
        "resources/list" => {
            let resources: Vec<Value> = state
                .registry
                .resources()
                .iter()
                .map(|r| {
                    json!({
                        "uri": r.uri,
                        "name": r.name,
                        "description": r.description,
                        "mimeType": r.mime_type,
                    })
                })
                .collect();
            Ok(json!({ "resources": resources }))
        }

        "resources/read" => {
            let uri = str_field(&params, "uri")?;
            let resource = state
                .registry
                .resource(&uri)
                .ok_or_else(|| Error::not_found(format!("Resource not found: {}", uri)))?;
            Ok(json!({
                "contents": [{
                    "uri": resource.uri,
                    "mimeType": resource.mime_type,
                    "text": resource.text,
                }],
            }))
        }

        "resources/templates/list" => {
            let templates: Vec<Value> = state
                .registry
                .templates()
                .iter()
                .map(|t| {
                    json!({
                        "uriTemplate": t.uri_template,
                        "name": t.name,
                        "description": t.description,
                        "mimeType": t.mime_type,
                    })
                })
                .collect();
            Ok(json!({ "resourceTemplates": templates }))
        }

        _ => Err(Error::UnknownMethod(method.to_string())),
    }
}

//! `prompts/list` and `prompts/get`.

use serde_json::{json, Value};
use std::collections::HashMap;

use crate::mcp::router::{str_field, ServerState};
use crate::types::{Error, Result};

pub fn handle(state: &ServerState, method: &str, params: Value) -> Result<Value> {
    match method {
        "prompts/list" => {
            let prompts: Vec<Value> = state
                .registry
                .prompts()
                .iter()
                .map(|p| {
                    json!({
                        "name": p.name,
                        "description": p.description,
                        "arguments": p.arguments,
                    })
                })
                .collect();
            Ok(json!({ "prompts": prompts }))
        }

        "prompts/get" => {
            let name = str_field(&params, "name")?;
            let prompt = state
                .registry
                .prompt(&name)
                .ok_or_else(|| Error::validation(format!("Unknown prompt: {}", name)))?;

            let mut values = HashMap::new();
            if let Some(arguments) = params.get("arguments").and_then(Value::as_object) {
                for (key, value) in arguments {
                    let value = value.as_str().ok_or_else(|| {
                        Error::validation(format!("Prompt argument '{}' must be a string", key))
                    })?;
                    values.insert(key.clone(), value.to_string());
                }
            }

            Ok(json!({
                "description": prompt.description,
                "messages": [{
                    "role": "user",
                    "content": { "type": "text", "text": prompt.render(&values)? },
                }],
            }))
        }

        _ => Err(Error::UnknownMethod(method.to_string())),
    }
}

//! Tool argument validation utilities.
//!
//! Arguments are checked for presence and string type only. Anything deeper
//! (name formats, GUID shapes) is the management API's job.

use serde_json::{Map, Value};

use crate::types::{Error, ResourceGroupName, Result, SubscriptionId};

/// Validate that a string is not empty.
pub fn validate_non_empty(s: &str, field: &str) -> Result<()> {
    if s.trim().is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

/// Fetch a required, non-empty string argument.
pub fn required_str<'a>(args: &'a Map<String, Value>, field: &str) -> Result<&'a str> {
    let value = args
        .get(field)
        .ok_or_else(|| Error::validation(format!("Missing required parameter: {}", field)))?;
    let s = value.as_str().ok_or_else(|| {
        Error::validation(format!(
            "Parameter '{}': expected string, got {}",
            field,
            value_type_name(value)
        ))
    })?;
    validate_non_empty(s, field)?;
    Ok(s)
}

pub fn subscription_id(args: &Map<String, Value>) -> Result<SubscriptionId> {
    let raw = required_str(args, "subscriptionId")?;
    SubscriptionId::from_string(raw.to_string()).map_err(Error::validation)
}

pub fn resource_group_name(args: &Map<String, Value>) -> Result<ResourceGroupName> {
    let raw = required_str(args, "resourceGroupName")?;
    ResourceGroupName::from_string(raw.to_string()).map_err(Error::validation)
}

/// Tool arguments must be a JSON object (absent means empty).
pub fn arguments_object(args: Value) -> Result<Map<String, Value>> {
    match args {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(Error::validation(format!(
            "Tool arguments must be an object, got {}",
            value_type_name(&other)
        ))),
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! The shared handler shape behind every Azure tool.
//!
//! Each handler validates its string arguments, opens a scoped [`ArmClient`],
//! performs one logical read and closes the client before looking at the
//! outcome. Errors from the remote call are returned unchanged.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::arm::ArmClient;
use crate::context::InvocationContext;
use crate::tools::{ParamDef, ToolHandler, ToolOutput};
use crate::types::{Error, Result};
use crate::validation;

/// Which ARM path a tool addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmTarget {
    /// `/subscriptions/{s}/resourcegroups/{rg}`
    ResourceGroup,
    /// `/subscriptions/{s}/resourceGroups/{rg}/resources`
    ResourcesInGroup,
    /// `/subscriptions/{s}/resourceGroups/{rg}/providers/{namespace}/{resource_type}/{name}`
    Provider {
        namespace: &'static str,
        resource_type: &'static str,
        name_param: &'static str,
        name_description: &'static str,
    },
}

impl ArmTarget {
    pub fn params(&self) -> Vec<ParamDef> {
        let mut params = vec![
            ParamDef::required("subscriptionId", "The Azure subscription ID."),
            ParamDef::required("resourceGroupName", "The Azure resource group name."),
        ];
        if let ArmTarget::Provider {
            name_param,
            name_description,
            ..
        } = self
        {
            params.push(ParamDef::required(*name_param, *name_description));
        }
        params
    }

    /// Path segments for the given arguments.
    pub fn segments(&self, args: &Map<String, Value>) -> Result<Vec<String>> {
        let subscription = validation::subscription_id(args)?;
        let group = validation::resource_group_name(args)?;

        let mut segments = vec!["subscriptions".to_string(), subscription.to_string()];
        match self {
            ArmTarget::ResourceGroup => {
                segments.extend(["resourcegroups".to_string(), group.to_string()]);
            }
            ArmTarget::ResourcesInGroup => {
                segments.extend([
                    "resourceGroups".to_string(),
                    group.to_string(),
                    "resources".to_string(),
                ]);
            }
            ArmTarget::Provider {
                namespace,
                resource_type,
                name_param,
                ..
            } => {
                let name = validation::required_str(args, name_param)?;
                segments.extend([
                    "resourceGroups".to_string(),
                    group.to_string(),
                    "providers".to_string(),
                    namespace.to_string(),
                    resource_type.to_string(),
                    name.to_string(),
                ]);
            }
        }
        Ok(segments)
    }
}

fn as_strs(segments: &[String]) -> Vec<&str> {
    segments.iter().map(String::as_str).collect()
}

/// Single-resource GET returning the full representation, read-only fields
/// included.
#[derive(Debug, Clone)]
pub struct ArmProfileTool {
    pub target: ArmTarget,
    pub api_version: &'static str,
    pub user_agent: &'static str,
}

#[async_trait]
impl ToolHandler for ArmProfileTool {
    async fn call(&self, ctx: &InvocationContext, args: &Map<String, Value>) -> Result<ToolOutput> {
        let segments = self.target.segments(args)?;

        let client = ArmClient::open(ctx, self.user_agent)?;
        let result = client.get(&as_strs(&segments), self.api_version).await;
        client.close();

        Ok(ToolOutput::Single(result?))
    }
}

/// Paginated list drained into one ordered sequence.
#[derive(Debug, Clone)]
pub struct ArmListTool {
    pub target: ArmTarget,
    pub api_version: &'static str,
    pub user_agent: &'static str,
}

#[async_trait]
impl ToolHandler for ArmListTool {
    async fn call(&self, ctx: &InvocationContext, args: &Map<String, Value>) -> Result<ToolOutput> {
        let segments = self.target.segments(args)?;

        let client = ArmClient::open(ctx, self.user_agent)?;
        let result = client.list(&as_strs(&segments), self.api_version).await;
        client.close();

        Ok(ToolOutput::Sequence(result?))
    }
}

/// Azure Resource Graph query; every `$skipToken` page is drained.
#[derive(Debug, Clone)]
pub struct ResourceGraphTool {
    pub api_version: &'static str,
    pub user_agent: &'static str,
}

impl ResourceGraphTool {
    async fn query_all(&self, client: &ArmClient, query: &str) -> Result<Vec<Value>> {
        let segments = ["providers", "Microsoft.ResourceGraph", "resources"];
        let mut rows = Vec::new();
        let mut skip_token: Option<String> = None;

        loop {
            let mut options = json!({ "resultFormat": "objectArray" });
            if let Some(token) = skip_token.take() {
                options["$skipToken"] = Value::String(token);
            }
            let body = json!({ "query": query, "options": options });

            let mut page = client.post(&segments, self.api_version, &body).await?;
            match page.get_mut("data").map(Value::take) {
                Some(Value::Array(items)) => rows.extend(items),
                Some(Value::Null) | None => {}
                Some(other) => {
                    return Err(Error::internal(format!(
                        "unexpected resource graph data shape: {}",
                        other
                    )))
                }
            }

            skip_token = page
                .get("$skipToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if skip_token.is_none() {
                return Ok(rows);
            }
        }
    }
}

#[async_trait]
impl ToolHandler for ResourceGraphTool {
    async fn call(&self, ctx: &InvocationContext, args: &Map<String, Value>) -> Result<ToolOutput> {
        let query = validation::required_str(args, "query")?;

        let client = ArmClient::open(ctx, self.user_agent)?;
        let result = self.query_all(&client, query).await;
        client.close();

        Ok(ToolOutput::Sequence(result?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VNET: ArmTarget = ArmTarget::Provider {
        namespace: "Microsoft.Network",
        resource_type: "virtualNetworks",
        name_param: "virtualNetworkName",
        name_description: "The Azure Virtual Network name.",
    };

    fn args(v: Value) -> Map<String, Value> {
        validation::arguments_object(v).unwrap()
    }

    #[test]
    fn test_provider_segments() {
        let segments = VNET
            .segments(&args(json!({
                "subscriptionId": "sub",
                "resourceGroupName": "rg",
                "virtualNetworkName": "vnet-1",
            })))
            .unwrap();
        assert_eq!(
            segments.join("/"),
            "subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet-1"
        );
    }

    #[test]
    fn test_resource_group_segments() {
        let a = args(json!({"subscriptionId": "sub", "resourceGroupName": "rg"}));
        assert_eq!(
            ArmTarget::ResourceGroup.segments(&a).unwrap().join("/"),
            "subscriptions/sub/resourcegroups/rg"
        );
        assert_eq!(
            ArmTarget::ResourcesInGroup.segments(&a).unwrap().join("/"),
            "subscriptions/sub/resourceGroups/rg/resources"
        );
    }

    #[test]
    fn test_provider_requires_name() {
        let err = VNET
            .segments(&args(json!({"subscriptionId": "sub", "resourceGroupName": "rg"})))
            .unwrap_err();
        assert!(err.to_string().contains("virtualNetworkName"));
    }

    #[test]
    fn test_params() {
        let names: Vec<String> = VNET.params().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["subscriptionId", "resourceGroupName", "virtualNetworkName"]);
        assert_eq!(ArmTarget::ResourceGroup.params().len(), 2);
    }
}

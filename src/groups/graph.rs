//! Azure Resource Graph queries, plus a prompt and a reference resource to
//! help clients write them.

use std::sync::Arc;

use super::handlers::ResourceGraphTool;
use crate::tools::{
    ParamDef, PromptArgument, PromptDescriptor, ResourceDescriptor, ToolDescriptor, ToolGroup,
};

const USER_AGENT: &str = "azure-graph-mcp-server/1.0";
const API_VERSION: &str = "2021-03-01";

pub const TABLES_URI: &str = "azure-resource-graph://tables";

const INSTRUCTIONS: &str = "This mcp server will send query to Azure graph service and it will \
return azure resource profile in json format";

const DESCRIPTION: &str = "Get azure profile in json format from azure rest graph service, send \
azure resource graph query to azure graph service and return the result in json format.";

const TABLES: &str = "\
resources: every tracked Azure resource (id, name, type, location, resourceGroup, subscriptionId, properties)
resourcecontainers: subscriptions, resource groups and management groups
advisorresources: Azure Advisor recommendations
healthresources: resource health availability statuses
networkresources: network manager and effective network data
policyresources: Azure Policy assignments and compliance states
securityresources: Microsoft Defender for Cloud assessments and alerts
";

const QUERY_PROMPT: &str = "Write an Azure Resource Graph (KQL) query that answers: {question}\n\
Restrict the query to these subscriptions if given: {subscriptions}\n\
Project only the columns needed, then run it with the 'Search azure graph service' tool.";

pub fn group() -> ToolGroup {
    ToolGroup::new("resource-graph")
        .with_instructions(INSTRUCTIONS)
        .with_dependencies(["arm:Microsoft.ResourceGraph", "azure-identity"])
        .with_tool(ToolDescriptor::new(
            "Search azure graph service",
            DESCRIPTION,
            vec![ParamDef::required(
                "query",
                "Azure resource graph query to be sent to azure graph service.",
            )],
            Arc::new(ResourceGraphTool {
                api_version: API_VERSION,
                user_agent: USER_AGENT,
            }),
        ))
        .with_prompt(PromptDescriptor {
            name: "resource-graph-query".to_string(),
            description: "Draft a Resource Graph query for a question about Azure resources"
                .to_string(),
            arguments: vec![
                PromptArgument {
                    name: "question".to_string(),
                    description: "What you want to know about your resources.".to_string(),
                    required: true,
                },
                PromptArgument {
                    name: "subscriptions".to_string(),
                    description: "Comma-separated subscription IDs to scope the query.".to_string(),
                    required: false,
                },
            ],
            template: QUERY_PROMPT.to_string(),
        })
        .with_resource(ResourceDescriptor {
            uri: TABLES_URI.to_string(),
            name: "Resource Graph tables".to_string(),
            description: "Commonly queried Azure Resource Graph tables".to_string(),
            mime_type: "text/plain".to_string(),
            text: TABLES.to_string(),
        })
}

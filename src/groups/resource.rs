//! Resource groups and their contents.

use std::sync::Arc;

use super::handlers::{ArmListTool, ArmProfileTool, ArmTarget};
use crate::tools::{ToolDescriptor, ToolGroup};

const USER_AGENT: &str = "azure-resource-mcp-server/1.0";
const API_VERSION: &str = "2022-09-01";

const INSTRUCTIONS: &str = "This mcp server will operate on Azure resource group. Put subscriptionid, \
and resource group name and get the list of azure resources.";

const GET_DESCRIPTION: &str = "Get Azure resource group profile in JSON format from azure rest api. \
SubscriptionId, resourceGroupName are required parameters. \
It returns the azure resource group profile in JSON format. \
The profile spec can be found here: https://learn.microsoft.com/en-us/rest/api/resources/resource-groups/get";

const LIST_DESCRIPTION: &str = "List Azure resource in resource group. \
SubscriptionId, resourceGroupName are required parameters. \
It returns the azure resource profile in JSON format, one item per resource. \
The profile spec can be found here: https://learn.microsoft.com/en-us/rest/api/resources/resources/list";

pub fn group() -> ToolGroup {
    ToolGroup::new("resource-group")
        .with_instructions(INSTRUCTIONS)
        .with_dependencies(["arm:Microsoft.Resources", "azure-identity"])
        .with_tool(ToolDescriptor::new(
            "Get-Azure-resource-Profile",
            GET_DESCRIPTION,
            ArmTarget::ResourceGroup.params(),
            Arc::new(ArmProfileTool {
                target: ArmTarget::ResourceGroup,
                api_version: API_VERSION,
                user_agent: USER_AGENT,
            }),
        ))
        .with_tool(ToolDescriptor::new(
            "List-Azure-resource-in-resourceGroup",
            LIST_DESCRIPTION,
            ArmTarget::ResourcesInGroup.params(),
            Arc::new(ArmListTool {
                target: ArmTarget::ResourcesInGroup,
                api_version: API_VERSION,
                user_agent: USER_AGENT,
            }),
        ))
}

//! Microsoft.Network resource families.
//!
//! Each family is its own group with a single "get profile" tool; they share
//! one user agent and API version.

use std::sync::Arc;

use super::handlers::{ArmProfileTool, ArmTarget};
use crate::tools::{ToolDescriptor, ToolGroup};

const USER_AGENT: &str = "azure-network-mcp-server/1.0";
const API_VERSION: &str = "2024-05-01";
const NAMESPACE: &str = "Microsoft.Network";

struct Family {
    group: &'static str,
    tool: &'static str,
    /// Human name used in descriptions, e.g. "Route Table".
    display: &'static str,
    resource_type: &'static str,
    name_param: &'static str,
    name_description: &'static str,
    docs: &'static str,
}

const FAMILIES: &[Family] = &[
    Family {
        group: "virtual-network",
        tool: "Get-Azure-VirtualNetwork-Profile",
        display: "Virtual Network",
        resource_type: "virtualNetworks",
        name_param: "virtualNetworkName",
        name_description: "The Azure Virtual Network name.",
        docs: "https://learn.microsoft.com/en-us/rest/api/virtualnetwork/virtual-networks/get",
    },
    Family {
        group: "route-table",
        tool: "Get-Azure-RouteTable Profile",
        display: "Route Table",
        resource_type: "routeTables",
        name_param: "routeTableName",
        name_description: "The Azure Route Table name.",
        docs: "https://learn.microsoft.com/en-us/rest/api/virtualnetwork/route-tables/get",
    },
    Family {
        group: "network-security-group",
        tool: "Get-Azure-NetworkSecurityGroups-Profile",
        display: "NetworkSecurityGroups",
        resource_type: "networkSecurityGroups",
        name_param: "networkSecurityGroupsName",
        name_description: "The Azure NetworkSecurityGroups name.",
        docs: "https://learn.microsoft.com/en-us/rest/api/virtualnetwork/network-security-groups/get",
    },
    Family {
        group: "nat-gateway",
        tool: "Get-Azure-NATGateway-Profile",
        display: "NATGateway",
        resource_type: "natGateways",
        name_param: "NATGatewayName",
        name_description: "The Azure NATGateway name.",
        docs: "https://learn.microsoft.com/en-us/rest/api/virtualnetwork/nat-gateways/get",
    },
    Family {
        group: "load-balancer",
        tool: "Get-Azure-loadBalancer-Profile",
        display: "loadBalancer",
        resource_type: "loadBalancers",
        name_param: "loadBalancerName",
        name_description: "The Azure loadBalancer name.",
        docs: "https://learn.microsoft.com/en-us/rest/api/load-balancer/load-balancers/get",
    },
];

impl Family {
    fn target(&self) -> ArmTarget {
        ArmTarget::Provider {
            namespace: NAMESPACE,
            resource_type: self.resource_type,
            name_param: self.name_param,
            name_description: self.name_description,
        }
    }

    fn resource_id(&self) -> String {
        format!(
            "/subscriptions/{{subscriptionId}}/resourceGroups/{{resourceGroupName}}/providers/{}/{}/{{{}}}",
            NAMESPACE, self.resource_type, self.name_param
        )
    }

    fn instructions(&self) -> String {
        format!(
            "This mcp server will operate on Azure {display} resources. Put subscriptionid, and \
             resource name and get the azure resource profile. SubscriptionId, resourceGroupName \
             and resource name can be parsed from the azure resource id. \
             The resource id should contain providers/{NAMESPACE}/{resource_type}",
            display = self.display,
            resource_type = self.resource_type,
        )
    }

    fn description(&self) -> String {
        format!(
            "Get Azure {display} profile in JSON format from azure rest api. It contains all of \
             {display} configurations. SubscriptionId, resourceGroupName and {param} are required \
             parameters. The subscriptionId is the Azure subscription ID, resourceGroupName is the \
             Azure resource group name, and {param} is the Azure {display} name. \
             The parameters can be parsed from the azure resource id. \
             The resource id is in the format of {id}. \
             It returns the azure {display} resource profile in JSON format. \
             The profile spec can be found here: {docs}",
            display = self.display,
            param = self.name_param,
            id = self.resource_id(),
            docs = self.docs,
        )
    }

    fn group(&self) -> ToolGroup {
        let target = self.target();
        ToolGroup::new(self.group)
            .with_instructions(self.instructions())
            .with_dependencies(["arm:Microsoft.Network", "azure-identity"])
            .with_tool(ToolDescriptor::new(
                self.tool,
                self.description(),
                target.params(),
                Arc::new(ArmProfileTool {
                    target,
                    api_version: API_VERSION,
                    user_agent: USER_AGENT,
                }),
            ))
    }
}

/// One group per network family, in declaration order.
pub fn groups() -> Vec<ToolGroup> {
    FAMILIES.iter().map(Family::group).collect()
}

//! Azure Kubernetes Service managed clusters.

use std::sync::Arc;

use super::handlers::{ArmProfileTool, ArmTarget};
use crate::tools::{ToolDescriptor, ToolGroup};

const USER_AGENT: &str = "aks-mcp-server/1.0";
const API_VERSION: &str = "2024-09-01";

const CLUSTER: ArmTarget = ArmTarget::Provider {
    namespace: "Microsoft.ContainerService",
    resource_type: "managedClusters",
    name_param: "clusterName",
    name_description: "The Azure kubernetes cluster name.",
};

const DESCRIPTION: &str = "Get Azure Kubernetes Service (AKS) managed cluster profile in JSON format \
from azure rest api. It contains all of aks cluster configurations. \
SubscriptionId, resourceGroupName and clusterName are required parameters. \
The subscriptionId is the Azure subscription ID, resourceGroupName is the Azure resource group name, \
and clusterName is the Azure kubernetes cluster name. \
The parameters can be parsed from the aks cluster resource id. \
The resource id is in the format of \
/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.ContainerService/managedClusters/{clusterName}. \
It returns the aks managedcluster resource profile in JSON format. \
The profile spec can be found here: https://learn.microsoft.com/en-us/rest/api/aks/managedclusters/get?#managedcluster";

pub fn group() -> ToolGroup {
    ToolGroup::new("managed-cluster")
        .with_dependencies(["arm:Microsoft.ContainerService", "azure-identity"])
        .with_tool(ToolDescriptor::new(
            "Get-Azure-ManagedClusterProfile",
            DESCRIPTION,
            CLUSTER.params(),
            Arc::new(ArmProfileTool {
                target: CLUSTER,
                api_version: API_VERSION,
                user_agent: USER_AGENT,
            }),
        ))
}

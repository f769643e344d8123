//! The Azure tool groups served by this crate.
//!
//! Groups are authored independently and merged by
//! [`ToolRegistry::aggregate`](crate::tools::ToolRegistry::aggregate).

pub mod container_service;
pub mod graph;
pub mod handlers;
pub mod network;
pub mod resource;

pub use handlers::{ArmListTool, ArmProfileTool, ArmTarget, ResourceGraphTool};

use crate::tools::ToolGroup;

/// Every group, in registration order.
pub fn all() -> Vec<ToolGroup> {
    let mut groups = vec![container_service::group()];
    groups.extend(network::groups());
    groups.push(resource::group());
    groups.push(graph::group());
    groups
}

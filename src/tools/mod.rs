//! Tool descriptors, groups and the aggregated registry.

pub mod definition;
pub mod group;
pub mod registry;

pub use definition::{
    ParamDef, PromptArgument, PromptDescriptor, ResourceDescriptor, ResourceTemplate,
    ToolDescriptor, ToolHandler, ToolOutput,
};
pub use group::ToolGroup;
pub use registry::{ConflictPolicy, ToolRegistry};

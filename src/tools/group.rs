//! Tool groups: one bundle of tools, prompts and resources per Azure
//! resource family.

use super::definition::{PromptDescriptor, ResourceDescriptor, ResourceTemplate, ToolDescriptor};

/// A named bundle authored independently of every other group.
///
/// Within one group, a tool name maps to exactly one descriptor; adding a
/// tool with an existing name replaces it in place.
#[derive(Debug, Clone, Default)]
pub struct ToolGroup {
    pub name: String,
    pub instructions: Option<String>,
    pub dependencies: Vec<String>,
    pub(super) tools: Vec<ToolDescriptor>,
    pub prompts: Vec<PromptDescriptor>,
    pub resources: Vec<ResourceDescriptor>,
    pub templates: Vec<ResourceTemplate>,
}

impl ToolGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn with_tool(mut self, tool: ToolDescriptor) -> Self {
        self.add_tool(tool);
        self
    }

    pub fn with_prompt(mut self, prompt: PromptDescriptor) -> Self {
        self.prompts.push(prompt);
        self
    }

    pub fn with_resource(mut self, resource: ResourceDescriptor) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_template(mut self, template: ResourceTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn add_tool(&mut self, tool: ToolDescriptor) {
        match self.tools.iter_mut().find(|t| t.name == tool.name) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

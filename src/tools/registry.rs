//! Merges independently authored tool groups into one registry.
//!
//! Aggregation runs once at startup. The resulting [`ToolRegistry`] is never
//! mutated afterwards and is shared behind an `Arc` for concurrent lookups.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use super::definition::{PromptDescriptor, ResourceDescriptor, ResourceTemplate, ToolDescriptor};
use super::group::ToolGroup;
use crate::types::{Error, Result};

/// How a tool name declared by more than one group is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Fail aggregation with [`Error::ToolConflict`].
    #[default]
    Reject,
    /// The later group's descriptor replaces the earlier one.
    LastWriteWins,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(ConflictPolicy::Reject),
            "last-write-wins" | "overwrite" => Ok(ConflictPolicy::LastWriteWins),
            other => Err(format!(
                "unknown conflict policy '{}', expected reject or last-write-wins",
                other
            )),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::Reject => write!(f, "reject"),
            ConflictPolicy::LastWriteWins => write!(f, "last-write-wins"),
        }
    }
}

struct Entry {
    group: String,
    tool: ToolDescriptor,
}

/// The merged, read-only view of every group.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    dependencies: BTreeSet<String>,
    instructions: Vec<String>,
    prompts: Vec<PromptDescriptor>,
    resources: Vec<ResourceDescriptor>,
    templates: Vec<ResourceTemplate>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .field("dependencies", &self.dependencies)
            .field("prompts", &self.prompts.len())
            .field("resources", &self.resources.len())
            .field("templates", &self.templates.len())
            .finish()
    }
}

impl ToolRegistry {
    /// Merge `groups` in iteration order.
    ///
    /// - tool names: union; duplicates resolved by `policy`
    /// - dependencies: deduplicated union
    /// - prompts, resources, templates: concatenated, no de-duplication
    ///
    /// Listing order is the order in which each name was first registered.
    pub fn aggregate<I>(groups: I, policy: ConflictPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = ToolGroup>,
    {
        let mut registry = ToolRegistry::default();

        for group in groups {
            let ToolGroup {
                name: group_name,
                instructions,
                dependencies,
                tools,
                prompts,
                resources,
                templates,
            } = group;

            for tool in tools {
                registry.insert(&group_name, tool, policy)?;
            }

            registry.dependencies.extend(dependencies);
            registry.instructions.extend(instructions);
            registry.prompts.extend(prompts);
            registry.resources.extend(resources);
            registry.templates.extend(templates);
        }

        tracing::debug!(
            tools = registry.entries.len(),
            dependencies = registry.dependencies.len(),
            %policy,
            "Tool groups aggregated"
        );
        Ok(registry)
    }

    fn insert(&mut self, group: &str, tool: ToolDescriptor, policy: ConflictPolicy) -> Result<()> {
        let Some(&slot) = self.index.get(&tool.name) else {
            self.index.insert(tool.name.clone(), self.entries.len());
            self.entries.push(Entry {
                group: group.to_string(),
                tool,
            });
            return Ok(());
        };

        let existing = &mut self.entries[slot];
        match policy {
            ConflictPolicy::Reject => Err(Error::ToolConflict {
                tool: tool.name,
                first_group: existing.group.clone(),
                second_group: group.to_string(),
            }),
            ConflictPolicy::LastWriteWins => {
                tracing::warn!(
                    tool = %tool.name,
                    replaced_group = %existing.group,
                    group,
                    "Tool name registered twice; later group overwrites earlier definition"
                );
                existing.group = group.to_string();
                existing.tool = tool;
                Ok(())
            }
        }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.entries[i].tool)
    }

    /// Name of the group whose definition is registered under `name`.
    pub fn origin(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&i| self.entries[i].group.as_str())
    }

    pub fn tools(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.entries.iter().map(|e| &e.tool)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.tool.name.as_str()).collect()
    }

    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Group instructions joined for the `initialize` response.
    pub fn instructions(&self) -> Option<String> {
        if self.instructions.is_empty() {
            None
        } else {
            Some(self.instructions.join("\n"))
        }
    }

    pub fn prompts(&self) -> &[PromptDescriptor] {
        &self.prompts
    }

    /// First prompt registered under `name`.
    pub fn prompt(&self, name: &str) -> Option<&PromptDescriptor> {
        self.prompts.iter().find(|p| p.name == name)
    }

    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    /// First resource registered under `uri`.
    pub fn resource(&self, uri: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|r| r.uri == uri)
    }

    pub fn templates(&self) -> &[ResourceTemplate] {
        &self.templates
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Tool, prompt and resource descriptors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::InvocationContext;
use crate::types::{Error, Result};
use crate::validation;

// =============================================================================
// Parameters
// =============================================================================

/// A single string parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl ParamDef {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
        }
    }
}

// =============================================================================
// Tool handler
// =============================================================================

/// Result of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// A single resource representation ("get").
    Single(Value),
    /// An ordered sequence of representations ("list"), in provider order.
    Sequence(Vec<Value>),
}

impl ToolOutput {
    pub fn len(&self) -> usize {
        match self {
            ToolOutput::Single(_) => 1,
            ToolOutput::Sequence(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The executable half of a tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, ctx: &InvocationContext, args: &Map<String, Value>) -> Result<ToolOutput>;
}

// =============================================================================
// Tool descriptor
// =============================================================================

/// Name, documentation and handler of one tool.
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamDef>,
    handler: Arc<dyn ToolHandler>,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        params: Vec<ParamDef>,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params,
            handler,
        }
    }

    /// JSON Schema of the tool's arguments.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({
                        "type": "string",
                        "title": p.name,
                        "description": p.description,
                    }),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check required parameters are present, then run the handler.
    pub async fn invoke(&self, ctx: &InvocationContext, args: Value) -> Result<ToolOutput> {
        let args = validation::arguments_object(args)?;
        for param in self.params.iter().filter(|p| p.required) {
            validation::required_str(&args, &param.name)?;
        }
        self.handler.call(ctx, &args).await
    }
}

// =============================================================================
// Prompts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// A static prompt template; `{argument}` placeholders are substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDescriptor {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
    pub template: String,
}

impl PromptDescriptor {
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String> {
        let mut text = self.template.clone();
        for arg in &self.arguments {
            match values.get(&arg.name) {
                Some(value) => text = text.replace(&format!("{{{}}}", arg.name), value),
                None if arg.required => {
                    return Err(Error::validation(format!(
                        "Missing required argument: {}",
                        arg.name
                    )))
                }
                None => text = text.replace(&format!("{{{}}}", arg.name), ""),
            }
        }
        Ok(text)
    }
}

// =============================================================================
// Resources
// =============================================================================

/// A static, readable resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
    pub text: String,
}

/// A parameterised resource URI advertised to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTemplate {
    pub uri_template: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::MockTokenCredential;
    use crate::types::ArmConfig;
    use pretty_assertions::assert_eq;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn call(&self, _ctx: &InvocationContext, args: &Map<String, Value>) -> Result<ToolOutput> {
            Ok(ToolOutput::Single(Value::Object(args.clone())))
        }
    }

    fn echo_tool() -> ToolDescriptor {
        ToolDescriptor::new(
            "Echo",
            "Echo arguments",
            vec![
                ParamDef::required("subscriptionId", "The Azure subscription ID."),
                ParamDef::required("resourceGroupName", "The Azure resource group name."),
            ],
            Arc::new(Echo),
        )
    }

    fn ctx() -> InvocationContext {
        InvocationContext::new(
            Arc::new(MockTokenCredential::new()),
            Arc::new(ArmConfig::default()),
        )
    }

    #[test]
    fn test_input_schema() {
        assert_eq!(
            echo_tool().input_schema(),
            json!({
                "type": "object",
                "properties": {
                    "subscriptionId": {
                        "type": "string",
                        "title": "subscriptionId",
                        "description": "The Azure subscription ID.",
                    },
                    "resourceGroupName": {
                        "type": "string",
                        "title": "resourceGroupName",
                        "description": "The Azure resource group name.",
                    },
                },
                "required": ["subscriptionId", "resourceGroupName"],
            })
        );
    }

    #[tokio::test]
    async fn test_invoke_passes_arguments() {
        let args = json!({"subscriptionId": "s", "resourceGroupName": "rg"});
        let output = echo_tool().invoke(&ctx(), args.clone()).await.unwrap();
        assert_eq!(output, ToolOutput::Single(args));
    }

    #[tokio::test]
    async fn test_invoke_missing_parameter() {
        let err = echo_tool()
            .invoke(&ctx(), json!({"subscriptionId": "s"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("resourceGroupName"));
    }

    #[test]
    fn test_prompt_render() {
        let prompt = PromptDescriptor {
            name: "p".to_string(),
            description: "d".to_string(),
            arguments: vec![
                PromptArgument {
                    name: "question".to_string(),
                    description: "q".to_string(),
                    required: true,
                },
                PromptArgument {
                    name: "scope".to_string(),
                    description: "s".to_string(),
                    required: false,
                },
            ],
            template: "Answer {question}{scope}".to_string(),
        };

        let mut values = HashMap::new();
        assert!(prompt.render(&values).is_err());

        values.insert("question".to_string(), "how many VMs?".to_string());
        assert_eq!(prompt.render(&values).unwrap(), "Answer how many VMs?");
    }
}

//! Tool registry: name-keyed lookup, built once and immutable afterwards.
//!
//! `ToolRegistry::builder().register(..).build()` rejects duplicate names.
//! `execute(name, args)` validates `args` against the tool schema's `required`
//! list, then awaits `Tool::execute`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ToolError;
use crate::tool::validation;
use crate::tool::{Tool, ToolSpec};

/// Registry of tools by unique name.
///
/// **Interaction**: Held by `AgentContext`; `ToolNode` dispatches through
/// `execute`, and `specs` is bound to the model client.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

/// Collects tools for a `ToolRegistry`; duplicates are reported by `build`.
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    pub fn register(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn register_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Builds the registry; fails on the first duplicated name.
    pub fn build(self) -> Result<ToolRegistry, ToolError> {
        let mut tools = HashMap::with_capacity(self.tools.len());
        for tool in self.tools {
            let name = tool.name().to_string();
            if tools.contains_key(&name) {
                return Err(ToolError::DuplicateName(name));
            }
            tools.insert(name, tool);
        }
        Ok(ToolRegistry { tools })
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Registry without tools.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Tool definitions for the model, sorted by name.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.names()
            .into_iter()
            .filter_map(|n| self.get(n))
            .map(|t| t.spec())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Looks up `name`, validates `args`, runs the tool.
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        validation::validate_args(&tool.parameters_schema(), &args)?;
        tool.execute(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{CalculatorTool, GetTimeTool};
    use serde_json::json;

    #[tokio::test]
    async fn registry_register_get_execute() {
        let reg = ToolRegistry::builder()
            .register(CalculatorTool::new())
            .build()
            .unwrap();
        assert!(reg.get("calculator").is_some());
        let out = reg
            .execute("calculator", json!({"expression": "3+5"}))
            .await
            .unwrap();
        assert_eq!(out, json!(8));
    }

    #[tokio::test]
    async fn registry_not_found() {
        let reg = ToolRegistry::empty();
        let err = reg.execute("nonexistent", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn registry_validates_required_args() {
        let reg = ToolRegistry::builder()
            .register(CalculatorTool::new())
            .build()
            .unwrap();
        let err = reg.execute("calculator", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::ValidationFailed(_)));
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = ToolRegistry::builder()
            .register(GetTimeTool::new())
            .register(GetTimeTool::new())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ToolError::DuplicateName(n) if n == "get_time"));
    }

    #[test]
    fn names_and_specs_sorted() {
        let reg = ToolRegistry::builder()
            .register(GetTimeTool::new())
            .register(CalculatorTool::new())
            .build()
            .unwrap();
        assert_eq!(reg.names(), vec!["calculator", "get_time"]);
        let specs = reg.specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "calculator");
    }
}

//! Tool trait, specs and registry.
//!
//! - `Tool`: a named capability (name, description, parameters_schema, execute)
//! - `ToolSpec`: the definition handed to the model so it can request a tool
//! - `ToolRegistry`: name-unique, immutable after `build`; validates then executes
//! - `validate_args`: checks `required` fields of a schema

mod builtin;
mod registry;
mod search;
mod validation;

pub use builtin::{CalculatorTool, GetTimeTool};
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use search::{TavilyConfig, TavilySearchTool};
pub use validation::validate_args;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Tool definition sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    /// Human-readable description for the model.
    pub description: Option<String>,
    /// JSON Schema of the arguments object.
    pub input_schema: Value,
}

/// A named capability the model may request.
///
/// `parameters_schema` is a minimal JSON Schema
/// (`{"type":"object","properties":{...},"required":[...]}`) used both for the
/// model-facing `ToolSpec` and for argument validation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used for registration and by the model; unique per registry.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    /// Runs with already-validated arguments, returns a JSON value.
    async fn execute(&self, args: Value) -> Result<Value, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            input_schema: self.parameters_schema(),
        }
    }
}

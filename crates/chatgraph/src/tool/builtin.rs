//! Built-in tools.
//!
//! - `CalculatorTool`: arithmetic expression evaluation, argument `expression: string`
//! - `GetTimeTool`: current local time, no arguments

use async_trait::async_trait;
use evalexpr::eval;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::tool::Tool;

/// Evaluates an arithmetic expression string with `evalexpr`.
#[derive(Debug, Default)]
pub struct CalculatorTool;

impl CalculatorTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluates a mathematical expression and returns the result. Example: 3+5, 2*10."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": { "type": "string", "description": "Arithmetic expression to evaluate, e.g. 3+5" }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let expr = args
            .get("expression")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ToolError::ValidationFailed("missing or non-string 'expression'".into())
            })?
            .trim();
        if expr.is_empty() {
            return Err(ToolError::ValidationFailed("expression must be non-empty".into()));
        }
        let result = eval(expr).map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(if let Ok(i) = result.as_int() {
            json!(i)
        } else if let Ok(f) = result.as_float() {
            json!(f)
        } else {
            json!(result.to_string())
        })
    }
}

/// Returns the current local time as `%Y-%m-%d %H:%M:%S`.
#[derive(Debug, Default)]
pub struct GetTimeTool;

impl GetTimeTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for GetTimeTool {
    fn name(&self) -> &str {
        "get_time"
    }

    fn description(&self) -> &str {
        "Returns the current local date and time."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> Result<Value, ToolError> {
        let now = chrono::Local::now();
        Ok(json!(now.format("%Y-%m-%d %H:%M:%S").to_string()))
    }
}

//! Argument validation against JSON Schema (minimal).
//!
//! Checks that `args` is an object holding every key in `schema["required"]`.
//! Used by `ToolRegistry::execute`; errors convert to `ToolError::ValidationFailed`.

use crate::error::ValidationError;
use serde_json::Value;

/// Validates `args` against the `required` list of `schema`.
///
/// Returns `Ok(())` when the schema lists no required keys or all are present.
pub fn validate_args(schema: &Value, args: &Value) -> Result<(), ValidationError> {
    let Some(req) = schema.get("required") else {
        return Ok(());
    };
    let Some(arr) = req.as_array() else {
        return Ok(());
    };
    let Some(obj) = args.as_object() else {
        return Err(ValidationError("args must be an object".into()));
    };
    for r in arr {
        let Some(s) = r.as_str() else {
            continue;
        };
        if !obj.contains_key(s) {
            return Err(ValidationError(format!("missing required field: {}", s)));
        }
    }
    Ok(())
}

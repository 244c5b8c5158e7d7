//! Argument validation against a tool's declared input schema.
//!
//! Runs at the leaf of every descriptor, after bound parameters have been
//! merged, so a pinned value is validated exactly like a caller-supplied one.

use jsonschema::{Draft, Validator};
use serde_json::Value;

use crate::descriptor::Arguments;
use crate::error::ToolError;

/// Compile a tool input schema.
pub fn compile_schema(tool: &str, schema: &Value) -> Result<Validator, ToolError> {
    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(schema)
        .map_err(|err| ToolError::validation(tool, format!("invalid input schema: {err}")))
}

/// Validate `arguments` against `schema`, reporting every violation.
pub fn validate_arguments(tool: &str, schema: &Value, arguments: &Arguments) -> Result<(), ToolError> {
    let validator = compile_schema(tool, schema)?;
    let instance = Value::Object(arguments.clone());

    let violations: Vec<String> = validator
        .iter_errors(&instance)
        .map(|err| err.to_string())
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ToolError::validation(tool, violations.join("; ")))
    }
}

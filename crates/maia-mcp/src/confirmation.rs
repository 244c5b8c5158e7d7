//! The confirmation gate for mutating tools.
//!
//! Every mutating tool is wrapped by [`guard`] before it reaches the registry.
//! A call runs only when its arguments contain `confirm` set to the JSON
//! boolean `true`; anything else is refused with a safety-check error and the
//! wrapped tool, and therefore the platform, is never touched.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::descriptor::{Arguments, Confirmation, ToolDescriptor, ToolHandler, ToolKind, ToolOutput};
use crate::error::ToolError;

/// Name of the confirmation argument.
pub const CONFIRM_PARAM: &str = "confirm";

/// Per-call gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unconfirmed,
    Executing,
}

impl GateState {
    /// Only the literal boolean `true` confirms. `"true"`, `1` and a missing
    /// key all leave the call unconfirmed.
    pub fn from_arguments(arguments: &Arguments) -> Self {
        match arguments.get(CONFIRM_PARAM) {
            Some(Value::Bool(true)) => GateState::Executing,
            _ => GateState::Unconfirmed,
        }
    }
}

/// Wrap a mutating tool with the confirmation gate.
///
/// Read tools and already-guarded tools are returned unchanged.
pub fn guard(tool: ToolDescriptor) -> ToolDescriptor {
    let ToolKind::Mutation(confirmation) = tool.kind() else {
        return tool;
    };
    if tool.is_guarded() {
        return tool;
    }

    let schema = with_confirm_param(tool.input_schema());
    let gate = ConfirmationGate {
        confirmation,
        inner: tool.clone(),
    };
    tool.wrap(schema, Arc::new(gate), true)
}

fn with_confirm_param(schema: &Value) -> Value {
    let mut schema = schema.clone();

    if let Some(obj) = schema.as_object_mut() {
        let properties = obj
            .entry("properties")
            .or_insert_with(|| json!({}));
        if let Some(properties) = properties.as_object_mut() {
            properties.entry(CONFIRM_PARAM).or_insert_with(|| {
                json!({
                    "type": "boolean",
                    "description": "Must be true. Ask the user for explicit confirmation before setting it."
                })
            });
        }

        let required = obj.entry("required").or_insert_with(|| json!([]));
        if let Some(required) = required.as_array_mut() {
            if !required.iter().any(|r| r == CONFIRM_PARAM) {
                required.push(json!(CONFIRM_PARAM));
            }
        }
    }

    schema
}

struct ConfirmationGate {
    confirmation: Confirmation,
    inner: ToolDescriptor,
}

#[async_trait]
impl ToolHandler for ConfirmationGate {
    async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        match GateState::from_arguments(&arguments) {
            GateState::Unconfirmed => {
                tracing::warn!(tool = %self.inner.name(), "Refusing unconfirmed mutation");
                Err(ToolError::SafetyCheck {
                    tool: self.inner.name().to_string(),
                    message: self.confirmation.refusal(),
                })
            }
            GateState::Executing => {
                tracing::info!(tool = %self.inner.name(), "Executing confirmed mutation");
                self.inner.call(arguments).await
            }
        }
    }
}

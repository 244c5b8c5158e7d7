//! Tool descriptors: name, input schema, kind, and the handler behind them.
//!
//! A descriptor is built once at composition time and is immutable afterwards.
//! Wrappers (parameter injection, the confirmation gate) produce a new
//! descriptor around an existing one rather than changing it in place.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::ToolError;
use crate::protocol::{ToolAnnotations, ToolDefinition};
use crate::validator::validate_arguments;

/// Named tool arguments.
pub type Arguments = Map<String, Value>;

/// The code that runs when a tool is called.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError>;
}

/// Wording used when a mutating call is refused for lack of confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    /// What the tool does, e.g. "delete meeting".
    pub action: &'static str,
    /// What the user must agree to, e.g. "PERMANENTLY DELETE this meeting".
    pub consent: &'static str,
}

impl Confirmation {
    /// The refusal message returned by the confirmation gate.
    pub fn refusal(&self) -> String {
        format!(
            "SAFETY CHECK: Cannot {} without explicit confirmation. \
             Please ask the user to confirm they want to {}.",
            self.action, self.consent
        )
    }
}

/// Whether a tool reads or mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Read,
    Mutation(Confirmation),
}

impl ToolKind {
    fn annotations(&self) -> ToolAnnotations {
        match self {
            ToolKind::Read => ToolAnnotations {
                read_only_hint: Some(true),
                destructive_hint: Some(false),
                requires_confirmation: None,
            },
            ToolKind::Mutation(_) => ToolAnnotations {
                read_only_hint: Some(false),
                destructive_hint: Some(true),
                requires_confirmation: Some(true),
            },
        }
    }
}

/// Successful tool result: a one-line summary plus structured data.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub summary: String,
    pub data: Value,
}

impl ToolOutput {
    pub fn new(summary: impl Into<String>, data: Value) -> Self {
        Self {
            summary: summary.into(),
            data,
        }
    }

    /// `Found N <noun>` with `{count, rows}` data.
    pub fn rows(noun: &str, rows: Vec<Value>) -> Self {
        let count = rows.len();
        Self {
            summary: format!("Found {count} {noun}"),
            data: json!({ "count": count, "rows": rows }),
        }
    }

    pub fn mutation(outcome: MutationOutcome) -> Self {
        let data = serde_json::to_value(&outcome).unwrap_or_default();
        Self {
            summary: outcome.message,
            data,
        }
    }
}

/// The record a successful mutation touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AffectedRecord {
    UpdatedRecord(Value),
    DeletedRecord(Value),
    AppliedMigration(Value),
}

/// Result of a successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome {
    pub success: bool,
    #[serde(flatten)]
    pub record: AffectedRecord,
    pub message: String,
}

impl MutationOutcome {
    pub fn new(record: AffectedRecord, message: impl Into<String>) -> Self {
        Self {
            success: true,
            record,
            message: message.into(),
        }
    }
}

/// A tool as exposed to clients.
#[derive(Clone)]
pub struct ToolDescriptor {
    definition: ToolDefinition,
    kind: ToolKind,
    guarded: bool,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Create a leaf descriptor. Arguments are validated against
    /// `input_schema` right before `handler` runs.
    pub fn new<H>(name: &str, description: &str, input_schema: Value, kind: ToolKind, handler: H) -> Self
    where
        H: ToolHandler + 'static,
    {
        let validated = SchemaValidated {
            tool: name.to_string(),
            schema: input_schema.clone(),
            inner: Arc::new(handler),
        };
        Self {
            definition: ToolDefinition {
                name: name.to_string(),
                description: Some(description.to_string()),
                input_schema,
                annotations: Some(kind.annotations()),
            },
            kind,
            guarded: false,
            handler: Arc::new(validated),
        }
    }

    /// A new descriptor with the same identity, a different exposed schema and
    /// a handler wrapping this one.
    pub(crate) fn wrap(
        &self,
        input_schema: Value,
        handler: Arc<dyn ToolHandler>,
        guarded: bool,
    ) -> Self {
        Self {
            definition: ToolDefinition {
                input_schema,
                ..self.definition.clone()
            },
            kind: self.kind,
            guarded: self.guarded || guarded,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn description(&self) -> &str {
        self.definition.description.as_deref().unwrap_or_default()
    }

    /// The schema clients see.
    pub fn input_schema(&self) -> &Value {
        &self.definition.input_schema
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn is_mutation(&self) -> bool {
        matches!(self.kind, ToolKind::Mutation(_))
    }

    /// Whether the confirmation gate wraps this descriptor.
    pub fn is_guarded(&self) -> bool {
        self.guarded
    }

    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    /// Call the tool with raw JSON arguments (`null` counts as `{}`).
    pub async fn invoke(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ToolError::validation(
                    self.name(),
                    format!("arguments must be a JSON object, got {}", json_type(&other)),
                ));
            }
        };
        self.call(arguments).await
    }

    pub async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        self.handler.call(arguments).await
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.definition.name)
            .field("kind", &self.kind)
            .field("guarded", &self.guarded)
            .finish()
    }
}

/// Validates the fully merged arguments before the leaf handler runs.
struct SchemaValidated {
    tool: String,
    schema: Value,
    inner: Arc<dyn ToolHandler>,
}

#[async_trait]
impl ToolHandler for SchemaValidated {
    async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        validate_arguments(&self.tool, &self.schema, &arguments)?;
        self.inner.call(arguments).await
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

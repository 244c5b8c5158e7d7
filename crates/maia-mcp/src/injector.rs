//! Binding fixed parameter values into tools.
//!
//! A bound key disappears from the schema clients see, and its value is
//! merged over whatever the caller sent. A key declared without a value is
//! left alone: it stays an ordinary caller parameter.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::descriptor::{Arguments, ToolDescriptor, ToolHandler, ToolOutput};
use crate::error::ToolError;

/// Parameter values fixed by server configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParameters {
    values: BTreeMap<String, Option<Value>>,
}

impl BoundParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to a value.
    pub fn bind(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.declare(key, Some(value.into()))
    }

    /// Declare `key` with a value that may be absent.
    pub fn declare(mut self, key: impl Into<String>, value: Option<Value>) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Keys that actually carry a value.
    pub fn present(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).and_then(Option::as_ref)
    }
}

/// Wrap `tool` so the present bound values are hidden from its schema and
/// always win over caller input.
pub fn inject(tool: ToolDescriptor, bound: &BoundParameters) -> ToolDescriptor {
    let values: Map<String, Value> = bound
        .present()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();

    if values.is_empty() {
        return tool;
    }

    let schema = strip_keys(tool.input_schema(), &values);
    let handler = Injected {
        values,
        inner: tool.clone(),
    };
    tool.wrap(schema, Arc::new(handler), false)
}

fn strip_keys(schema: &Value, keys: &Map<String, Value>) -> Value {
    let mut schema = schema.clone();

    if let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        for key in keys.keys() {
            properties.remove(key);
        }
    }
    if let Some(required) = schema.get_mut("required").and_then(Value::as_array_mut) {
        required.retain(|name| name.as_str().is_none_or(|name| !keys.contains_key(name)));
    }

    schema
}

struct Injected {
    values: Map<String, Value>,
    inner: ToolDescriptor,
}

#[async_trait]
impl ToolHandler for Injected {
    async fn call(&self, mut arguments: Arguments) -> Result<ToolOutput, ToolError> {
        for (key, value) in &self.values {
            if arguments.contains_key(key) {
                tracing::debug!(tool = %self.inner.name(), key = %key, "Ignoring caller value for bound parameter");
            }
            arguments.insert(key.clone(), value.clone());
        }
        self.inner.call(arguments).await
    }
}

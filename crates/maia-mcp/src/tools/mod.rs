//! Tool providers.
//!
//! Each submodule builds the descriptors for one provider. Every tool takes an
//! optional `project_id`; when the server pins a project the injector removes
//! it from the exposed schema and fills it in.

pub mod ask_maia;
pub mod ask_maia_write;
pub mod database;
pub mod debug;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::descriptor::{Arguments, ToolDescriptor, ToolHandler, ToolKind, ToolOutput};
use crate::error::ToolError;
use crate::injector::{BoundParameters, inject};
use crate::platform::{Platform, resolve_project};
use crate::statement::Statement;

pub(crate) const PROJECT_ID: &str = "project_id";

/// Everything a provider needs to build its tools.
#[derive(Clone)]
pub struct ToolContext {
    pub platform: Arc<dyn Platform>,
    /// Project every tool is pinned to, if any.
    pub project_id: Option<String>,
}

impl ToolContext {
    pub fn new(platform: Arc<dyn Platform>, project_id: Option<String>) -> Self {
        Self {
            platform,
            project_id,
        }
    }

    /// Values injected into every tool.
    pub fn bound_parameters(&self) -> BoundParameters {
        BoundParameters::new().declare(PROJECT_ID, self.project_id.clone().map(Value::String))
    }

    /// Apply parameter injection to a freshly built tool.
    pub(crate) fn finish(&self, tool: ToolDescriptor) -> ToolDescriptor {
        inject(tool, &self.bound_parameters())
    }

    /// The project a call should run against.
    pub(crate) async fn project_for(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let requested = arguments.get(PROJECT_ID).and_then(Value::as_str);
        resolve_project(self.platform.as_ref(), requested).await
    }
}

/// Object schema with the shared optional `project_id` property.
pub(crate) fn object_schema(properties: Value, required: &[&str]) -> Value {
    let mut props = match properties {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    props.insert(
        PROJECT_ID.to_string(),
        json!({
            "type": "string",
            "description": "Project to run against. Defaults to the platform's selection."
        }),
    );
    json!({
        "type": "object",
        "properties": props,
        "required": required,
    })
}

/// Deserialize validated arguments into a typed parameter struct.
pub(crate) fn parse_params<P: DeserializeOwned>(tool: &str, arguments: &Arguments) -> Result<P, ToolError> {
    serde_json::from_value(Value::Object(arguments.clone()))
        .map_err(|err| ToolError::validation(tool, err.to_string()))
}

/// Human label for a record: its title when non-empty, its id otherwise.
pub(crate) fn record_label(record: &Value, title_key: &str, id_key: &str) -> String {
    match record.get(title_key).and_then(Value::as_str) {
        Some(title) if !title.trim().is_empty() => title.to_string(),
        _ => match record.get(id_key) {
            Some(Value::String(id)) => id.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => "unknown".to_string(),
        },
    }
}

/// A read tool that builds one statement from its parameters and returns the
/// rows.
pub(crate) struct QueryTool<P> {
    name: &'static str,
    noun: &'static str,
    context: ToolContext,
    build: fn(&P) -> Statement,
}

#[async_trait]
impl<P> ToolHandler for QueryTool<P>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        let params: P = parse_params(self.name, &arguments)?;
        let project = self.context.project_for(&arguments).await?;
        let statement = (self.build)(&params);

        tracing::debug!(tool = self.name, project = %project, statement = %statement, "Running read query");
        let rows = self.context.platform.execute_query(&project, &statement).await?;
        Ok(ToolOutput::rows(self.noun, rows))
    }
}

/// Build a read-only query tool.
pub(crate) fn query_tool<P>(
    context: &ToolContext,
    name: &'static str,
    description: &str,
    schema: Value,
    noun: &'static str,
    build: fn(&P) -> Statement,
) -> ToolDescriptor
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    let handler = QueryTool {
        name,
        noun,
        context: context.clone(),
        build,
    };
    context.finish(ToolDescriptor::new(name, description, schema, ToolKind::Read, handler))
}

pub(crate) fn default_limit_50() -> i64 {
    50
}

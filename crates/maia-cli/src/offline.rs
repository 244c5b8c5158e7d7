//! A platform with no database behind it.
//!
//! `maia tools` and `maia check` compose the real registry to inspect it, but
//! never run a tool, so they do not need a connection.

use async_trait::async_trait;
use maia_core::{MaiaConfig, SafetyMode};
use maia_mcp::{
    ComposeError, FeatureComposer, Platform, PlatformError, Statement, ToolContext, ToolRegistry,
};
use serde_json::Value;
use std::sync::Arc;

pub struct OfflinePlatform;

fn offline(project_id: &str) -> PlatformError {
    PlatformError::new(format!(
        "no database connection for project '{project_id}' in offline mode"
    ))
}

#[async_trait]
impl Platform for OfflinePlatform {
    async fn execute_sql(
        &self,
        project_id: &str,
        _statement: &Statement,
        _read_only: bool,
    ) -> Result<Vec<Value>, PlatformError> {
        Err(offline(project_id))
    }

    async fn execute_transaction(
        &self,
        project_id: &str,
        _statements: &[Statement],
    ) -> Result<Vec<Value>, PlatformError> {
        Err(offline(project_id))
    }

    async fn select_project(&self) -> Result<String, PlatformError> {
        Err(PlatformError::new("no projects are available in offline mode"))
    }
}

/// Compose the configured feature groups against [`OfflinePlatform`].
pub fn compose(config: &MaiaConfig, mode: SafetyMode) -> Result<ToolRegistry, ComposeError> {
    let groups = config.feature_groups()?;
    let context = ToolContext::new(Arc::new(OfflinePlatform), config.project_id.clone());
    FeatureComposer::new(context).compose_groups(&groups, mode)
}

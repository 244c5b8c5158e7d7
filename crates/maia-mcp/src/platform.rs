//! The platform port.
//!
//! Tools reach the database only through [`Platform`]. The Postgres
//! implementation lives in `maia-adapter-pg`; tests use in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PlatformError, ToolError};
use crate::statement::Statement;

/// What the client told us about itself during `initialize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub client_name: Option<String>,
    pub client_version: Option<String>,
    pub protocol_version: Option<String>,
}

/// Database platform used by every tool.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Optional session initialization. Failures are logged by the server and
    /// never abort the session.
    async fn init(&self, _session: &SessionInfo) -> Result<(), PlatformError> {
        Ok(())
    }

    /// Run one statement against a project's database.
    ///
    /// With `read_only` the statement runs in a read-only transaction.
    /// Each returned row is a JSON object keyed by column name.
    async fn execute_sql(
        &self,
        project_id: &str,
        statement: &Statement,
        read_only: bool,
    ) -> Result<Vec<Value>, PlatformError>;

    /// Read-only shorthand for [`Platform::execute_sql`].
    async fn execute_query(
        &self,
        project_id: &str,
        statement: &Statement,
    ) -> Result<Vec<Value>, PlatformError> {
        self.execute_sql(project_id, statement, true).await
    }

    /// Run several write statements in one transaction.
    ///
    /// Either every statement commits or none does. Returns the rows of the
    /// last statement.
    async fn execute_transaction(
        &self,
        project_id: &str,
        statements: &[Statement],
    ) -> Result<Vec<Value>, PlatformError>;

    /// Pick the project to use when the caller did not name one.
    async fn select_project(&self) -> Result<String, PlatformError>;
}

/// The project a call runs against: the pinned/passed id, or the platform's choice.
pub async fn resolve_project(
    platform: &dyn Platform,
    project_id: Option<&str>,
) -> Result<String, ToolError> {
    match project_id {
        Some(id) => Ok(id.to_string()),
        None => {
            let selected = platform.select_project().await?;
            tracing::debug!(project_id = %selected, "No project given, using platform selection");
            Ok(selected)
        }
    }
}

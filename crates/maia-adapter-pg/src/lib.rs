//! Postgres implementation of the Maia platform port.
//!
//! One lazily connected pool per configured project. Every statement runs in
//! its own transaction; read-only calls mark the transaction `READ ONLY` so
//! Postgres itself rejects writes.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use maia_core::{ConfigError, MaiaConfig, ProjectConfig};
use maia_mcp::{Platform, PlatformError, SessionInfo, SqlParam, Statement, StatementShape};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgConnection, PgPoolOptions};
use sqlx::{Arguments, Executor, PgPool, Row};

fn args_add<T>(args: &mut PgArguments, v: T) -> Result<(), PlatformError>
where
    T: Send + Sync + 'static,
    for<'q> T: sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    args.add(v)
        .map_err(|e| PlatformError::new(format!("failed to bind parameter: {e}")))
}

fn bind_params(params: &[SqlParam]) -> Result<PgArguments, PlatformError> {
    let mut args = PgArguments::default();
    for param in params {
        match param {
            SqlParam::Text(s) => args_add(&mut args, s.clone())?,
            SqlParam::Int(n) => args_add(&mut args, *n)?,
            SqlParam::Bool(b) => args_add(&mut args, *b)?,
            SqlParam::TextList(items) => args_add(&mut args, items.clone())?,
            SqlParam::Null => args_add(&mut args, Option::<String>::None)?,
        }
    }
    Ok(args)
}

/// Wrap a row-returning statement so each row comes back as one JSON object.
///
/// The inner statement sits on its own lines so a trailing `--` comment
/// cannot swallow the wrapper.
fn rows_sql(sql: &str) -> String {
    format!("WITH q AS (\n{sql}\n) SELECT to_jsonb(q) AS row FROM q")
}

/// Keep the database's own message for database errors.
fn platform_err(e: sqlx::Error) -> PlatformError {
    match e {
        sqlx::Error::Database(db) => PlatformError::new(db.message()),
        other => PlatformError::new(other.to_string()),
    }
}

pub struct PostgresPlatform {
    pools: BTreeMap<String, PgPool>,
}

impl PostgresPlatform {
    /// Build lazy pools for every configured project. No connection is made
    /// until the first statement runs.
    pub fn from_config(config: &MaiaConfig) -> Result<Self, ConfigError> {
        let mut pools = BTreeMap::new();
        for (name, project) in &config.projects {
            pools.insert(name.clone(), lazy_pool(name, project)?);
        }
        tracing::debug!(projects = ?pools.keys().collect::<Vec<_>>(), "Configured Postgres platform");
        Ok(Self { pools })
    }

    /// A platform over a single existing pool.
    pub fn with_pool(project_id: impl Into<String>, pool: PgPool) -> Self {
        Self {
            pools: BTreeMap::from([(project_id.into(), pool)]),
        }
    }

    pub fn project_ids(&self) -> Vec<&str> {
        self.pools.keys().map(String::as_str).collect()
    }

    fn pool(&self, project_id: &str) -> Result<&PgPool, PlatformError> {
        self.pools.get(project_id).ok_or_else(|| {
            PlatformError::new(format!(
                "unknown project '{}' (configured: {})",
                project_id,
                self.project_ids().join(", ")
            ))
        })
    }
}

fn lazy_pool(name: &str, project: &ProjectConfig) -> Result<PgPool, ConfigError> {
    let url = project.resolve_database_url(name)?;
    PgPoolOptions::new()
        .max_connections(project.pool.max_connections)
        .acquire_timeout(Duration::from_secs(project.pool.acquire_timeout_seconds))
        .connect_lazy(&url)
        .map_err(|e| ConfigError::Config(format!("invalid database URL for project '{name}': {e}")))
}

async fn run_statement(
    conn: &mut PgConnection,
    statement: &Statement,
) -> Result<Vec<Value>, PlatformError> {
    match statement.shape() {
        StatementShape::Rows => {
            let sql = rows_sql(statement.sql());
            let args = bind_params(statement.params())?;
            let records = conn
                .fetch_all(sqlx::query_with(&sql, args))
                .await
                .map_err(platform_err)?;
            records
                .iter()
                .map(|r| r.try_get::<Value, _>("row"))
                .collect::<Result<Vec<_>, _>>()
                .map_err(platform_err)
        }
        StatementShape::Command => {
            let result = if statement.params().is_empty() {
                conn.execute(sqlx::raw_sql(statement.sql())).await
            } else {
                let args = bind_params(statement.params())?;
                conn.execute(sqlx::query_with(statement.sql(), args)).await
            };
            result.map_err(platform_err)?;
            Ok(Vec::new())
        }
    }
}

#[async_trait]
impl Platform for PostgresPlatform {
    async fn init(&self, session: &SessionInfo) -> Result<(), PlatformError> {
        tracing::info!(
            client = ?session.client_name,
            version = ?session.client_version,
            projects = self.pools.len(),
            "Postgres platform session started"
        );
        Ok(())
    }

    async fn execute_sql(
        &self,
        project_id: &str,
        statement: &Statement,
        read_only: bool,
    ) -> Result<Vec<Value>, PlatformError> {
        let pool = self.pool(project_id)?;
        tracing::debug!(project = %project_id, read_only, statement = %statement, "Executing statement");

        let mut tx = pool.begin().await.map_err(platform_err)?;
        if read_only {
            sqlx::query("SET TRANSACTION READ ONLY")
                .execute(&mut *tx)
                .await
                .map_err(platform_err)?;
        }

        let rows = run_statement(&mut *tx, statement).await?;

        tx.commit().await.map_err(platform_err)?;
        Ok(rows)
    }

    async fn execute_transaction(
        &self,
        project_id: &str,
        statements: &[Statement],
    ) -> Result<Vec<Value>, PlatformError> {
        let pool = self.pool(project_id)?;
        tracing::debug!(project = %project_id, statements = statements.len(), "Executing transaction");

        // Dropping the transaction on an early return rolls it back.
        let mut tx = pool.begin().await.map_err(platform_err)?;
        let mut rows = Vec::new();
        for statement in statements {
            tracing::debug!(project = %project_id, statement = %statement, "Executing statement");
            rows = run_statement(&mut *tx, statement).await?;
        }

        tx.commit().await.map_err(platform_err)?;
        Ok(rows)
    }

    async fn select_project(&self) -> Result<String, PlatformError> {
        let mut ids = self.pools.keys();
        match (ids.next(), ids.next()) {
            (Some(only), None) => Ok(only.clone()),
            (None, _) => Err(PlatformError::new("no projects are configured")),
            (Some(_), Some(_)) => Err(PlatformError::new(format!(
                "several projects are configured ({}); pass project_id or pin one",
                self.project_ids().join(", ")
            ))),
        }
    }
}

//! Database operation tools: schema inspection, read-only SQL and migrations.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{ToolContext, object_schema, parse_params, query_tool};
use crate::descriptor::{
    AffectedRecord, Arguments, Confirmation, MutationOutcome, ToolDescriptor, ToolHandler,
    ToolKind, ToolOutput,
};
use crate::error::ToolError;
use crate::statement::Statement;

const MIGRATIONS_TABLE: &str = "maia_migrations.schema_migrations";

const ENSURE_MIGRATIONS_TABLE: &str = "CREATE SCHEMA IF NOT EXISTS maia_migrations; \
     CREATE TABLE IF NOT EXISTS maia_migrations.schema_migrations ( \
         version text PRIMARY KEY, \
         name text NOT NULL UNIQUE, \
         applied_at timestamptz NOT NULL DEFAULT now() \
     )";

/// Read tools of the `database` group.
pub fn read_tools(context: &ToolContext) -> Vec<ToolDescriptor> {
    vec![
        query_tool(
            context,
            "list_tables",
            "List tables in one or more schemas",
            object_schema(
                json!({
                    "schemas": {
                        "type": "array",
                        "items": { "type": "string" },
                        "default": ["public"],
                        "description": "Schemas to include (default: [\"public\"])"
                    }
                }),
                &[],
            ),
            "tables",
            list_tables,
        ),
        query_tool(
            context,
            "list_extensions",
            "List installed Postgres extensions",
            object_schema(json!({}), &[]),
            "extensions",
            list_extensions,
        ),
        context.finish(ToolDescriptor::new(
            "list_migrations",
            "List migrations applied through apply_migration",
            object_schema(json!({}), &[]),
            ToolKind::Read,
            ListMigrations {
                context: context.clone(),
            },
        )),
        query_tool(
            context,
            "execute_sql",
            "Run a SQL query in a read-only transaction",
            object_schema(
                json!({
                    "query": { "type": "string", "minLength": 1, "description": "The SQL query to run" }
                }),
                &["query"],
            ),
            "rows",
            execute_sql,
        ),
    ]
}

/// Write tools of the `database` group.
pub fn write_tools(context: &ToolContext) -> Vec<ToolDescriptor> {
    vec![context.finish(ToolDescriptor::new(
        "apply_migration",
        "Apply a named DDL migration and record it. REQUIRES explicit user confirmation.",
        object_schema(
            json!({
                "name": { "type": "string", "minLength": 1, "description": "Migration name in snake_case" },
                "query": { "type": "string", "minLength": 1, "description": "The DDL to apply" },
                "confirm": {
                    "type": "boolean",
                    "description": "REQUIRED: must be true to confirm the user explicitly wants to apply this migration"
                }
            }),
            &["name", "query", "confirm"],
        ),
        ToolKind::Mutation(Confirmation {
            action: "apply migration",
            consent: "apply this migration to the database schema",
        }),
        ApplyMigration {
            context: context.clone(),
        },
    ))]
}

#[derive(Debug, Deserialize)]
struct ListTablesParams {
    #[serde(default = "default_schemas")]
    schemas: Vec<String>,
}

fn default_schemas() -> Vec<String> {
    vec!["public".to_string()]
}

fn list_tables(p: &ListTablesParams) -> Statement {
    let mut stmt = Statement::query(
        "SELECT t.table_schema AS schema, t.table_name AS name, t.table_type AS type, \
         (SELECT count(*) FROM information_schema.columns c \
          WHERE c.table_schema = t.table_schema AND c.table_name = t.table_name) AS column_count \
         FROM information_schema.tables t \
         WHERE t.table_schema::text = ANY(",
    );
    let ph = stmt.bind(p.schemas.clone());
    stmt.push_sql(&format!("{ph}) ORDER BY t.table_schema, t.table_name"));
    stmt
}

#[derive(Debug, Deserialize)]
struct NoParams {}

fn list_extensions(_: &NoParams) -> Statement {
    Statement::query(
        "SELECT name, default_version, installed_version, comment \
         FROM pg_available_extensions \
         WHERE installed_version IS NOT NULL \
         ORDER BY name",
    )
}

#[derive(Debug, Deserialize)]
struct ExecuteSqlParams {
    query: String,
}

// Caller SQL runs verbatim, always inside a read-only transaction.
fn execute_sql(p: &ExecuteSqlParams) -> Statement {
    Statement::query(p.query.trim().trim_end_matches(';').to_string())
}

struct ListMigrations {
    context: ToolContext,
}

#[async_trait]
impl ToolHandler for ListMigrations {
    async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        let project = self.context.project_for(&arguments).await?;
        let platform = &self.context.platform;

        let present = platform
            .execute_query(
                &project,
                &Statement::query(format!(
                    "SELECT to_regclass('{MIGRATIONS_TABLE}') IS NOT NULL AS present"
                )),
            )
            .await?;
        let exists = present
            .first()
            .and_then(|row| row.get("present"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !exists {
            return Ok(ToolOutput::rows("migrations", Vec::new()));
        }

        let rows = platform
            .execute_query(
                &project,
                &Statement::query(format!(
                    "SELECT version, name, applied_at FROM {MIGRATIONS_TABLE} ORDER BY version"
                )),
            )
            .await?;
        Ok(ToolOutput::rows("migrations", rows))
    }
}

#[derive(Debug, Deserialize)]
struct ApplyMigrationParams {
    name: String,
    query: String,
}

struct ApplyMigration {
    context: ToolContext,
}

#[async_trait]
impl ToolHandler for ApplyMigration {
    async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        let params: ApplyMigrationParams = parse_params("apply_migration", &arguments)?;
        let project = self.context.project_for(&arguments).await?;
        let platform = &self.context.platform;

        platform
            .execute_sql(&project, &Statement::command(ENSURE_MIGRATIONS_TABLE), false)
            .await?;

        let mut existing = Statement::query(format!(
            "SELECT version FROM {MIGRATIONS_TABLE} WHERE name = "
        ));
        let ph = existing.bind(params.name.as_str());
        existing.push_sql(&ph);
        if !platform.execute_query(&project, &existing).await?.is_empty() {
            return Err(ToolError::validation(
                "apply_migration",
                format!("Migration '{}' has already been applied.", params.name),
            ));
        }

        let version = chrono::Utc::now().format("%Y%m%d%H%M%S%3f").to_string();
        let mut record = Statement::query(format!(
            "INSERT INTO {MIGRATIONS_TABLE} (version, name) VALUES ("
        ));
        let v = record.bind(version);
        let n = record.bind(params.name.as_str());
        record.push_sql(&format!("{v}, {n}) RETURNING version, name, applied_at"));

        // The DDL and its record commit together or not at all.
        let rows = platform
            .execute_transaction(&project, &[Statement::command(params.query.as_str()), record])
            .await?;
        let applied = rows
            .into_iter()
            .next()
            .unwrap_or_else(|| json!({ "name": params.name }));
        tracing::info!(project = %project, migration = %params.name, "Applied migration");

        Ok(ToolOutput::mutation(MutationOutcome::new(
            AffectedRecord::AppliedMigration(applied),
            format!("Successfully applied migration: {}", params.name),
        )))
    }
}

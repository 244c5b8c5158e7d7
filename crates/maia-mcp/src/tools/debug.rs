//! Debugging tools: live connections and table statistics.

use serde::Deserialize;
use serde_json::json;

use super::{ToolContext, default_limit_50, object_schema, query_tool};
use crate::descriptor::ToolDescriptor;
use crate::statement::Statement;

pub fn read_tools(context: &ToolContext) -> Vec<ToolDescriptor> {
    vec![
        query_tool(
            context,
            "get_active_queries",
            "Show queries currently running on the database",
            object_schema(
                json!({
                    "include_idle": {
                        "type": "boolean",
                        "default": false,
                        "description": "Include idle connections"
                    }
                }),
                &[],
            ),
            "connections",
            active_queries,
        ),
        query_tool(
            context,
            "get_table_stats",
            "Row counts, dead tuples, scans and vacuum times per table",
            object_schema(
                json!({
                    "schema": { "type": "string", "default": "public", "description": "Schema to inspect" },
                    "limit": { "type": "integer", "minimum": 1, "default": 50, "description": "Maximum number of tables" }
                }),
                &[],
            ),
            "tables",
            table_stats,
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct ActiveQueriesParams {
    #[serde(default)]
    include_idle: bool,
}

fn active_queries(p: &ActiveQueriesParams) -> Statement {
    let mut stmt = Statement::query(
        "SELECT pid, usename AS user_name, datname AS database, state, wait_event_type, \
         now() - query_start AS duration, left(query, 500) AS query \
         FROM pg_stat_activity \
         WHERE pid <> pg_backend_pid() AND (",
    );
    let ph = stmt.bind(p.include_idle);
    stmt.push_sql(&format!(
        "{ph} OR state IS DISTINCT FROM 'idle') ORDER BY query_start NULLS LAST"
    ));
    stmt
}

#[derive(Debug, Deserialize)]
struct TableStatsParams {
    #[serde(default = "default_schema")]
    schema: String,
    #[serde(default = "default_limit_50")]
    limit: i64,
}

fn default_schema() -> String {
    "public".to_string()
}

fn table_stats(p: &TableStatsParams) -> Statement {
    let mut stmt = Statement::query(
        "SELECT relname AS table_name, n_live_tup AS live_rows, n_dead_tup AS dead_rows, \
         seq_scan, idx_scan, last_vacuum, last_autovacuum, last_analyze \
         FROM pg_stat_user_tables WHERE schemaname = ",
    );
    let schema = stmt.bind(p.schema.as_str());
    let limit = stmt.bind(p.limit);
    stmt.push_sql(&format!("{schema} ORDER BY n_live_tup DESC LIMIT {limit}"));
    stmt
}

//! Shared fixtures for the safety tests.
//!
//! This module provides:
//! - An in-memory meetings platform that counts every call
//! - Helpers to compose registries over it

use async_trait::async_trait;
use maia_core::SafetyMode;
use maia_mcp::{
    FeatureComposer, Platform, PlatformError, SqlParam, Statement, ToolContext, ToolRegistry,
};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// IN-MEMORY PLATFORM
// =============================================================================

/// A statement the platform received.
#[derive(Debug, Clone)]
pub struct Received {
    pub project_id: String,
    pub sql: String,
    pub params: Vec<SqlParam>,
    pub read_only: bool,
}

/// Meetings keyed by Fireflies id. Understands the meeting existence check
/// and delete; answers everything else with no rows.
#[derive(Default)]
pub struct MeetingsPlatform {
    meetings: Mutex<BTreeMap<String, Value>>,
    received: Mutex<Vec<Received>>,
    selections: AtomicUsize,
    selection_error: Mutex<Option<String>>,
    delete_error: Mutex<Option<String>>,
}

impl MeetingsPlatform {
    pub fn with_meetings(meetings: &[(&str, &str)]) -> Arc<Self> {
        let platform = Self::default();
        {
            let mut store = platform.meetings.lock().unwrap();
            for (id, title) in meetings {
                store.insert(
                    id.to_string(),
                    json!({
                        "fireflies_id": id,
                        "fireflies_title": title,
                        "fireflies_timestamp": "2026-10-01T10:00:00Z"
                    }),
                );
            }
        }
        Arc::new(platform)
    }

    /// Make every later project selection fail with `message`.
    pub fn fail_selection(&self, message: &str) {
        *self.selection_error.lock().unwrap() = Some(message.to_string());
    }

    /// Make every later `DELETE FROM meetings` fail with `message`.
    pub fn fail_deletes(&self, message: &str) {
        *self.delete_error.lock().unwrap() = Some(message.to_string());
    }

    /// Number of statements executed so far.
    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    pub fn selections(&self) -> usize {
        self.selections.load(Ordering::SeqCst)
    }

    pub fn contains(&self, fireflies_id: &str) -> bool {
        self.meetings.lock().unwrap().contains_key(fireflies_id)
    }

    fn first_text(statement: &Statement) -> Option<String> {
        statement.params().iter().find_map(|p| match p {
            SqlParam::Text(s) => Some(s.clone()),
            _ => None,
        })
    }
}

impl MeetingsPlatform {
    fn run(
        &self,
        project_id: &str,
        statement: &Statement,
        read_only: bool,
    ) -> Result<Vec<Value>, PlatformError> {
        self.received.lock().unwrap().push(Received {
            project_id: project_id.to_string(),
            sql: statement.sql().to_string(),
            params: statement.params().to_vec(),
            read_only,
        });

        let sql = statement.sql();
        let mut meetings = self.meetings.lock().unwrap();

        if sql.starts_with("SELECT fireflies_id, fireflies_title, fireflies_timestamp FROM meetings") {
            let id = Self::first_text(statement).unwrap_or_default();
            return Ok(meetings.get(&id).cloned().into_iter().collect());
        }
        if sql.starts_with("DELETE FROM meetings") {
            if read_only {
                return Err(PlatformError::new(
                    "cannot execute DELETE in a read-only transaction",
                ));
            }
            if let Some(message) = self.delete_error.lock().unwrap().clone() {
                return Err(PlatformError::new(message));
            }
            let id = Self::first_text(statement).unwrap_or_default();
            return Ok(meetings
                .remove(&id)
                .map(|m| {
                    json!({
                        "fireflies_id": m["fireflies_id"],
                        "fireflies_title": m["fireflies_title"]
                    })
                })
                .into_iter()
                .collect());
        }
        Ok(Vec::new())
    }
}

#[async_trait]
impl Platform for MeetingsPlatform {
    async fn execute_sql(
        &self,
        project_id: &str,
        statement: &Statement,
        read_only: bool,
    ) -> Result<Vec<Value>, PlatformError> {
        self.run(project_id, statement, read_only)
    }

    async fn execute_transaction(
        &self,
        project_id: &str,
        statements: &[Statement],
    ) -> Result<Vec<Value>, PlatformError> {
        let mut rows = Vec::new();
        for statement in statements {
            rows = self.run(project_id, statement, false)?;
        }
        Ok(rows)
    }

    async fn select_project(&self) -> Result<String, PlatformError> {
        self.selections.fetch_add(1, Ordering::SeqCst);
        match self.selection_error.lock().unwrap().clone() {
            Some(message) => Err(PlatformError::new(message)),
            None => Ok("default-project".to_string()),
        }
    }
}

// =============================================================================
// COMPOSITION HELPERS
// =============================================================================

pub fn compose(
    platform: Arc<MeetingsPlatform>,
    pinned: Option<&str>,
    groups: &[&str],
    mode: SafetyMode,
) -> ToolRegistry {
    let context = ToolContext::new(platform, pinned.map(str::to_string));
    FeatureComposer::new(context)
        .compose(groups.iter().copied(), mode)
        .expect("composition should succeed")
}

/// Every subset of the three feature groups.
pub fn all_group_subsets() -> Vec<Vec<&'static str>> {
    let groups = ["ask-maia", "database", "debug"];
    (0..(1u8 << groups.len()))
        .map(|mask| {
            groups
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, g)| *g)
                .collect()
        })
        .collect()
}

pub const MUTATING_TOOLS: [&str; 5] = [
    "update_meeting_category",
    "delete_meeting",
    "insert_meeting_note",
    "update_email_status",
    "apply_migration",
];

/// Arguments that pass validation for each mutating tool, minus `confirm`.
pub fn valid_arguments(tool: &str) -> Value {
    match tool {
        "update_meeting_category" => json!({
            "fireflies_id": "abc",
            "category_id": "cat-1",
            "assessment_type": "External"
        }),
        "delete_meeting" => json!({ "fireflies_id": "abc" }),
        "insert_meeting_note" => json!({ "fireflies_id": "abc", "note_content": "Follow up" }),
        "update_email_status" => json!({ "email_id": "e1", "subject": "Re: pricing" }),
        "apply_migration" => json!({ "name": "add_notes", "query": "SELECT 1" }),
        other => panic!("no fixture arguments for {other}"),
    }
}

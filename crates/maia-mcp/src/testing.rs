//! In-memory platform used by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PlatformError;
use crate::platform::Platform;
use crate::statement::Statement;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub project_id: String,
    pub statement: Statement,
    pub read_only: bool,
    /// Index of the enclosing `execute_transaction`, if any.
    pub transaction: Option<usize>,
}

/// Records every call and answers with queued responses (empty rows once
/// the queue runs dry).
#[derive(Default)]
pub(crate) struct RecordingPlatform {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<Result<Vec<Value>, PlatformError>>>,
    selections: AtomicUsize,
    selection_error: Option<String>,
    transactions: Mutex<Vec<bool>>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(
        responses: impl IntoIterator<Item = Result<Vec<Value>, PlatformError>>,
    ) -> Self {
        let platform = Self::new();
        platform.responses.lock().unwrap().extend(responses);
        platform
    }

    /// A platform whose project selection always fails.
    pub fn failing_selection(message: &str) -> Self {
        Self {
            selection_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn selections(&self) -> usize {
        self.selections.load(Ordering::SeqCst)
    }

    /// One entry per `execute_transaction`: `true` if it committed.
    pub fn transactions(&self) -> Vec<bool> {
        self.transactions.lock().unwrap().clone()
    }

    fn record(
        &self,
        project_id: &str,
        statement: &Statement,
        read_only: bool,
        transaction: Option<usize>,
    ) -> Result<Vec<Value>, PlatformError> {
        self.calls.lock().unwrap().push(RecordedCall {
            project_id: project_id.to_string(),
            statement: statement.clone(),
            read_only,
            transaction,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn execute_sql(
        &self,
        project_id: &str,
        statement: &Statement,
        read_only: bool,
    ) -> Result<Vec<Value>, PlatformError> {
        self.record(project_id, statement, read_only, None)
    }

    async fn execute_transaction(
        &self,
        project_id: &str,
        statements: &[Statement],
    ) -> Result<Vec<Value>, PlatformError> {
        let index = {
            let mut transactions = self.transactions.lock().unwrap();
            transactions.push(false);
            transactions.len() - 1
        };
        let mut rows = Vec::new();
        for statement in statements {
            rows = self.record(project_id, statement, false, Some(index))?;
        }
        self.transactions.lock().unwrap()[index] = true;
        Ok(rows)
    }

    async fn select_project(&self) -> Result<String, PlatformError> {
        self.selections.fetch_add(1, Ordering::SeqCst);
        match &self.selection_error {
            Some(message) => Err(PlatformError::new(message.clone())),
            None => Ok("selected-project".to_string()),
        }
    }
}

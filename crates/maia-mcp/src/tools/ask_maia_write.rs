//! Ask-Maia write tools: meeting and email edits.
//!
//! These are built unguarded; the composer wraps each one with the
//! confirmation gate before registering it.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::ask_maia::AssessmentType;
use super::{ToolContext, object_schema, parse_params, record_label};
use crate::descriptor::{
    AffectedRecord, Arguments, Confirmation, MutationOutcome, ToolDescriptor, ToolHandler,
    ToolKind, ToolOutput,
};
use crate::error::ToolError;
use crate::statement::Statement;

fn confirm_schema(what: &str) -> Value {
    json!({
        "type": "boolean",
        "description": format!("REQUIRED: must be true to confirm the user explicitly wants to {what}")
    })
}

/// All ask-maia write tools.
pub fn write_tools(context: &ToolContext) -> Vec<ToolDescriptor> {
    vec![
        context.finish(ToolDescriptor::new(
            "update_meeting_category",
            "Update the AI categorization of a meeting. REQUIRES explicit user confirmation.",
            object_schema(
                json!({
                    "fireflies_id": { "type": "string", "minLength": 1, "description": "The Fireflies meeting ID to update" },
                    "category_id": { "type": "string", "minLength": 1, "description": "The new meeting category ID" },
                    "assessment_type": {
                        "type": "string",
                        "enum": ["Internal", "External"],
                        "description": "Internal or External meeting type"
                    },
                    "rationale": { "type": "string", "description": "Optional rationale for the change" },
                    "confirm": confirm_schema("update this meeting")
                }),
                &["fireflies_id", "category_id", "assessment_type", "confirm"],
            ),
            ToolKind::Mutation(Confirmation {
                action: "update meeting category",
                consent: "update this meeting categorization",
            }),
            UpdateMeetingCategory {
                context: context.clone(),
            },
        )),
        context.finish(ToolDescriptor::new(
            "delete_meeting",
            "PERMANENTLY delete a meeting. REQUIRES explicit user confirmation. Use with extreme caution.",
            object_schema(
                json!({
                    "fireflies_id": { "type": "string", "minLength": 1, "description": "The Fireflies meeting ID to delete" },
                    "confirm": confirm_schema("DELETE this meeting permanently")
                }),
                &["fireflies_id", "confirm"],
            ),
            ToolKind::Mutation(Confirmation {
                action: "delete meeting",
                consent: "PERMANENTLY DELETE this meeting",
            }),
            DeleteMeeting {
                context: context.clone(),
            },
        )),
        context.finish(ToolDescriptor::new(
            "insert_meeting_note",
            "Append a timestamped note to a meeting summary. REQUIRES explicit user confirmation.",
            object_schema(
                json!({
                    "fireflies_id": { "type": "string", "minLength": 1, "description": "The Fireflies meeting ID to annotate" },
                    "note_content": { "type": "string", "minLength": 1, "description": "The note to add" },
                    "confirm": confirm_schema("add this note")
                }),
                &["fireflies_id", "note_content", "confirm"],
            ),
            ToolKind::Mutation(Confirmation {
                action: "insert meeting note",
                consent: "add this note",
            }),
            InsertMeetingNote {
                context: context.clone(),
            },
        )),
        context.finish(ToolDescriptor::new(
            "update_email_status",
            "Update the subject or body of an AI-generated email. REQUIRES explicit user confirmation.",
            object_schema(
                json!({
                    "email_id": { "type": "string", "minLength": 1, "description": "The email ID to update" },
                    "subject": { "type": "string", "description": "New email subject" },
                    "body": { "type": "string", "description": "New email body" },
                    "confirm": confirm_schema("update this email")
                }),
                &["email_id", "confirm"],
            ),
            ToolKind::Mutation(Confirmation {
                action: "update email",
                consent: "update this email",
            }),
            UpdateEmail {
                context: context.clone(),
            },
        )),
    ]
}

/// Run a write statement and return the first affected row, or `NotFound`.
async fn write_one(
    context: &ToolContext,
    project: &str,
    statement: &Statement,
    not_found: impl FnOnce() -> String,
) -> Result<Value, ToolError> {
    let rows = context.platform.execute_sql(project, statement, false).await?;
    rows.into_iter()
        .next()
        .ok_or_else(|| ToolError::not_found(not_found()))
}

// =============================================================================
// update_meeting_category
// =============================================================================

#[derive(Debug, Deserialize)]
struct UpdateCategoryParams {
    fireflies_id: String,
    category_id: String,
    assessment_type: AssessmentType,
    rationale: Option<String>,
}

fn update_category_statement(p: &UpdateCategoryParams) -> Statement {
    let mut stmt = Statement::query("UPDATE meeting_categorizations AS mc SET ");
    let category = stmt.bind(p.category_id.as_str());
    let kind = stmt.bind(p.assessment_type.as_str());
    stmt.push_sql(&format!("meeting_category_id = {category}, assessment_type = {kind}"));
    if let Some(rationale) = p.rationale.as_deref().filter(|r| !r.is_empty()) {
        let ph = stmt.bind(rationale);
        stmt.push_sql(&format!(", meeting_category_rationale = {ph}"));
    }
    let id = stmt.bind(p.fireflies_id.as_str());
    stmt.push_sql(&format!(
        " FROM meetings m \
         WHERE m.meeting_categorization_by_ai_id = mc.id AND m.fireflies_id = {id} \
         RETURNING mc.id, mc.name AS category_name, mc.meeting_category_id, mc.assessment_type, \
         mc.meeting_category_rationale, m.fireflies_id, m.fireflies_title"
    ));
    stmt
}

struct UpdateMeetingCategory {
    context: ToolContext,
}

#[async_trait]
impl ToolHandler for UpdateMeetingCategory {
    async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        let params: UpdateCategoryParams = parse_params("update_meeting_category", &arguments)?;
        let project = self.context.project_for(&arguments).await?;

        let record = write_one(
            &self.context,
            &project,
            &update_category_statement(&params),
            || format!("No categorization found for meeting with Fireflies ID {}.", params.fireflies_id),
        )
        .await?;

        let label = record_label(&record, "fireflies_title", "fireflies_id");
        Ok(ToolOutput::mutation(MutationOutcome::new(
            AffectedRecord::UpdatedRecord(record),
            format!("Successfully updated meeting category for: {label}"),
        )))
    }
}

// =============================================================================
// delete_meeting
// =============================================================================

#[derive(Debug, Deserialize)]
struct DeleteMeetingParams {
    fireflies_id: String,
}

struct DeleteMeeting {
    context: ToolContext,
}

#[async_trait]
impl ToolHandler for DeleteMeeting {
    async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        let params: DeleteMeetingParams = parse_params("delete_meeting", &arguments)?;
        let project = self.context.project_for(&arguments).await?;
        let not_found = || format!("Meeting with Fireflies ID {} not found.", params.fireflies_id);

        let mut check = Statement::query(
            "SELECT fireflies_id, fireflies_title, fireflies_timestamp FROM meetings WHERE fireflies_id = ",
        );
        let ph = check.bind(params.fireflies_id.as_str());
        check.push_sql(&ph);

        let existing = self.context.platform.execute_query(&project, &check).await?;
        if existing.is_empty() {
            return Err(ToolError::not_found(not_found()));
        }

        let mut delete = Statement::query("DELETE FROM meetings WHERE fireflies_id = ");
        let ph = delete.bind(params.fireflies_id.as_str());
        delete.push_sql(&format!("{ph} RETURNING fireflies_id, fireflies_title"));

        let record = write_one(&self.context, &project, &delete, not_found).await?;
        tracing::info!(project = %project, fireflies_id = %params.fireflies_id, "Deleted meeting");

        let label = record_label(&record, "fireflies_title", "fireflies_id");
        Ok(ToolOutput::mutation(MutationOutcome::new(
            AffectedRecord::DeletedRecord(record),
            format!("Successfully deleted meeting: {label}"),
        )))
    }
}

// =============================================================================
// insert_meeting_note
// =============================================================================

#[derive(Debug, Deserialize)]
struct InsertNoteParams {
    fireflies_id: String,
    note_content: String,
}

fn insert_note_statement(p: &InsertNoteParams, timestamp: &str) -> Statement {
    let mut stmt = Statement::query("UPDATE meetings SET fireflies_meeting_summary = ");
    let ts = stmt.bind(timestamp);
    let note = stmt.bind(p.note_content.as_str());
    let id = stmt.bind(p.fireflies_id.as_str());
    stmt.push_sql(&format!(
        "COALESCE(fireflies_meeting_summary, '') || E'\\n\\n--- User Note (' || {ts} || E') ---\\n' || {note} \
         WHERE fireflies_id = {id} \
         RETURNING fireflies_id, fireflies_title"
    ));
    stmt
}

struct InsertMeetingNote {
    context: ToolContext,
}

#[async_trait]
impl ToolHandler for InsertMeetingNote {
    async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        let params: InsertNoteParams = parse_params("insert_meeting_note", &arguments)?;
        let project = self.context.project_for(&arguments).await?;
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = write_one(
            &self.context,
            &project,
            &insert_note_statement(&params, &timestamp),
            || format!("Meeting with Fireflies ID {} not found.", params.fireflies_id),
        )
        .await?;

        let label = record_label(&record, "fireflies_title", "fireflies_id");
        Ok(ToolOutput::mutation(MutationOutcome::new(
            AffectedRecord::UpdatedRecord(record),
            format!("Successfully added note to meeting: {label}"),
        )))
    }
}

// =============================================================================
// update_email_status
// =============================================================================

#[derive(Debug, Deserialize)]
struct UpdateEmailParams {
    email_id: String,
    subject: Option<String>,
    body: Option<String>,
}

fn update_email_statement(p: &UpdateEmailParams) -> Option<Statement> {
    let mut stmt = Statement::query("UPDATE emails SET ");
    let mut assignments = Vec::new();

    if let Some(subject) = p.subject.as_deref().filter(|s| !s.is_empty()) {
        let ph = stmt.bind(subject);
        assignments.push(format!("generated_email_subject = {ph}"));
    }
    if let Some(body) = p.body.as_deref().filter(|b| !b.is_empty()) {
        let ph = stmt.bind(body);
        assignments.push(format!("generated_email_body = {ph}"));
    }
    if assignments.is_empty() {
        return None;
    }

    let id = stmt.bind(p.email_id.as_str());
    stmt.push_sql(&format!(
        "{} WHERE id::text = {id} RETURNING id, fireflies_id, generated_email_subject",
        assignments.join(", ")
    ));
    Some(stmt)
}

struct UpdateEmail {
    context: ToolContext,
}

#[async_trait]
impl ToolHandler for UpdateEmail {
    async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        let params: UpdateEmailParams = parse_params("update_email_status", &arguments)?;
        let statement = update_email_statement(&params).ok_or_else(|| {
            ToolError::validation(
                "update_email_status",
                "No updates specified. Please provide subject or body to update.",
            )
        })?;
        let project = self.context.project_for(&arguments).await?;

        let record = write_one(&self.context, &project, &statement, || {
            format!("Email with ID {} not found.", params.email_id)
        })
        .await?;

        let label = record_label(&record, "generated_email_subject", "id");
        Ok(ToolOutput::mutation(MutationOutcome::new(
            AffectedRecord::UpdatedRecord(record),
            format!("Successfully updated email: {label}"),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirmation::guard;
    use crate::statement::SqlParam;
    use crate::testing::RecordingPlatform;
    use std::sync::Arc;

    fn guarded(platform: Arc<RecordingPlatform>, name: &str) -> ToolDescriptor {
        let context = ToolContext::new(platform, Some("p1".to_string()));
        write_tools(&context)
            .into_iter()
            .find(|t| t.name() == name)
            .map(guard)
            .unwrap()
    }

    #[test]
    fn test_all_write_tools_are_mutations() {
        let context = ToolContext::new(Arc::new(RecordingPlatform::new()), None);
        for tool in write_tools(&context) {
            assert!(tool.is_mutation(), "{} should be a mutation", tool.name());
            assert!(!tool.is_guarded());
        }
    }

    #[test]
    fn test_note_text_is_a_parameter() {
        let stmt = insert_note_statement(
            &InsertNoteParams {
                fireflies_id: "abc".to_string(),
                note_content: "it's done; DROP TABLE meetings".to_string(),
            },
            "2026-10-18T09:00:00.000Z",
        );
        assert!(!stmt.sql().contains("DROP TABLE"));
        assert!(stmt.sql().contains("--- User Note (' || $1 || E') ---"));
        assert_eq!(
            stmt.params()[1],
            SqlParam::Text("it's done; DROP TABLE meetings".to_string())
        );
    }

    #[test]
    fn test_email_update_needs_a_field() {
        let params = UpdateEmailParams {
            email_id: "e1".to_string(),
            subject: Some(String::new()),
            body: None,
        };
        assert!(update_email_statement(&params).is_none());

        let params = UpdateEmailParams {
            email_id: "e1".to_string(),
            subject: None,
            body: Some("Hi".to_string()),
        };
        let stmt = update_email_statement(&params).unwrap();
        assert!(stmt.sql().contains("generated_email_body = $1"));
        assert!(stmt.sql().contains("id::text = $2"));
    }

    #[tokio::test]
    async fn test_update_email_without_fields_is_validation_error() {
        let platform = Arc::new(RecordingPlatform::new());
        let err = guarded(platform.clone(), "update_email_status")
            .invoke(json!({"email_id": "e1", "confirm": true}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_category_not_found() {
        let platform = Arc::new(RecordingPlatform::new());
        let err = guarded(platform.clone(), "update_meeting_category")
            .invoke(json!({
                "fireflies_id": "abc",
                "category_id": "cat-1",
                "assessment_type": "External",
                "confirm": true
            }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NotFoundError");

        let calls = platform.calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].read_only);
    }

    #[tokio::test]
    async fn test_insert_note_success_message() {
        let platform = Arc::new(RecordingPlatform::with_responses([Ok(vec![json!({
            "fireflies_id": "abc",
            "fireflies_title": "Quarterly review"
        })])]));
        let out = guarded(platform.clone(), "insert_meeting_note")
            .invoke(json!({"fireflies_id": "abc", "note_content": "Follow up", "confirm": true}))
            .await
            .unwrap();
        assert_eq!(out.summary, "Successfully added note to meeting: Quarterly review");
        assert_eq!(out.data["success"], true);
        assert_eq!(out.data["updated_record"]["fireflies_id"], "abc");
    }

    #[tokio::test]
    async fn test_delete_checks_before_deleting() {
        let platform = Arc::new(RecordingPlatform::new());
        let err = guarded(platform.clone(), "delete_meeting")
            .invoke(json!({"fireflies_id": "abc", "confirm": true}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NotFoundError");

        let calls = platform.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].read_only);
        assert!(calls[0].statement.sql().starts_with("SELECT"));
    }
}

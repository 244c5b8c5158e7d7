//! Ask-Maia read tools: meetings, AI-generated emails, categories and users.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{ToolContext, default_limit_50, object_schema, parse_params, query_tool};
use crate::descriptor::{Arguments, ToolDescriptor, ToolHandler, ToolKind, ToolOutput};
use crate::error::ToolError;
use crate::statement::Statement;

/// Whether a meeting was held with internal or external participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AssessmentType {
    Internal,
    External,
}

impl AssessmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Internal => "Internal",
            AssessmentType::External => "External",
        }
    }
}

fn assessment_type_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["Internal", "External"],
        "description": "Filter by internal or external meetings"
    })
}

fn limit_schema(default: i64) -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "default": default,
        "description": format!("Maximum number of results (default: {default})")
    })
}

const MEETING_COLUMNS: &str = "SELECT m.id, m.fireflies_id, m.fireflies_title, m.fireflies_timestamp, \
     m.fireflies_meeting_summary, m.contacts_name_and_email, mc.name AS category_name, \
     mc.assessment_type, m.created_at \
     FROM meetings m \
     LEFT JOIN meeting_categorizations mc ON m.meeting_categorization_by_ai_id = mc.id";

/// All ask-maia read tools.
pub fn read_tools(context: &ToolContext) -> Vec<ToolDescriptor> {
    vec![
        query_tool(
            context,
            "get_meetings_by_category",
            "Get meetings filtered by AI-assigned category (sales, demo, internal, etc.)",
            object_schema(
                json!({
                    "category_name": {
                        "type": "string",
                        "description": "Name of the meeting category (e.g. \"Sales Call\", \"Product Demo\")"
                    },
                    "assessment_type": assessment_type_schema(),
                    "limit": limit_schema(50)
                }),
                &[],
            ),
            "meetings",
            meetings_by_category,
        ),
        query_tool(
            context,
            "search_meeting_transcripts",
            "Search meeting transcripts, summaries and titles for a term",
            object_schema(
                json!({
                    "search_term": { "type": "string", "minLength": 1, "description": "Text to search for" },
                    "limit": limit_schema(30)
                }),
                &["search_term"],
            ),
            "meetings",
            search_transcripts,
        ),
        query_tool(
            context,
            "get_ai_generated_emails",
            "Get AI-generated follow-up emails, optionally for one meeting",
            object_schema(
                json!({
                    "fireflies_id": { "type": "string", "description": "Only emails for this Fireflies meeting" },
                    "limit": limit_schema(50)
                }),
                &[],
            ),
            "emails",
            ai_generated_emails,
        ),
        query_tool(
            context,
            "get_meetings_by_participant",
            "Find meetings by participant name or email",
            object_schema(
                json!({
                    "participant": { "type": "string", "minLength": 1, "description": "Participant name or email" },
                    "limit": limit_schema(50)
                }),
                &["participant"],
            ),
            "meetings",
            meetings_by_participant,
        ),
        query_tool(
            context,
            "get_meeting_categories",
            "List meeting categories with how often each is used",
            object_schema(json!({ "assessment_type": assessment_type_schema() }), &[]),
            "categories",
            meeting_categories,
        ),
        context.finish(ToolDescriptor::new(
            "get_meeting_stats",
            "Get aggregated meeting statistics by category, month and assessment type",
            object_schema(
                json!({
                    "group_by": {
                        "type": "string",
                        "enum": ["category", "month", "assessment_type", "all"],
                        "default": "all",
                        "description": "How to group the statistics"
                    }
                }),
                &[],
            ),
            ToolKind::Read,
            MeetingStats {
                context: context.clone(),
            },
        )),
        query_tool(
            context,
            "get_meeting_by_fireflies_id",
            "Get complete details of a meeting by its Fireflies ID",
            object_schema(
                json!({
                    "fireflies_id": { "type": "string", "minLength": 1, "description": "The Fireflies meeting ID" }
                }),
                &["fireflies_id"],
            ),
            "meetings",
            meeting_by_fireflies_id,
        ),
        query_tool(
            context,
            "get_recent_meetings",
            "Get meetings from the last N days",
            object_schema(
                json!({
                    "days_back": {
                        "type": "integer",
                        "minimum": 1,
                        "default": 7,
                        "description": "Number of days to look back (default: 7)"
                    },
                    "limit": limit_schema(50)
                }),
                &[],
            ),
            "meetings",
            recent_meetings,
        ),
        query_tool(
            context,
            "get_external_contacts",
            "List external meeting contacts with their meeting counts",
            object_schema(json!({ "limit": limit_schema(100) }), &[]),
            "contacts",
            external_contacts,
        ),
        query_tool(
            context,
            "get_user_list",
            "List all users of the Maia system",
            object_schema(json!({}), &[]),
            "users",
            user_list,
        ),
    ]
}

// =============================================================================
// STATEMENT TEMPLATES
// =============================================================================

#[derive(Debug, Deserialize)]
struct CategoryParams {
    category_name: Option<String>,
    assessment_type: Option<AssessmentType>,
    #[serde(default = "default_limit_50")]
    limit: i64,
}

fn meetings_by_category(p: &CategoryParams) -> Statement {
    let mut stmt = Statement::query(format!("{MEETING_COLUMNS} WHERE 1=1"));
    if let Some(name) = &p.category_name {
        let ph = stmt.bind(name.as_str());
        stmt.push_sql(&format!(" AND mc.name ILIKE '%' || {ph} || '%'"));
    }
    if let Some(kind) = p.assessment_type {
        let ph = stmt.bind(kind.as_str());
        stmt.push_sql(&format!(" AND mc.assessment_type = {ph}"));
    }
    let ph = stmt.bind(p.limit);
    stmt.push_sql(&format!(" ORDER BY m.fireflies_timestamp DESC LIMIT {ph}"));
    stmt
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    search_term: String,
    #[serde(default = "default_search_limit")]
    limit: i64,
}

fn default_search_limit() -> i64 {
    30
}

fn search_transcripts(p: &SearchParams) -> Statement {
    let mut stmt = Statement::query(
        "SELECT m.id, m.fireflies_id, m.fireflies_title, m.fireflies_timestamp, \
         m.fireflies_meeting_summary, m.fireflies_transcript, m.contacts_name_and_email, \
         mc.name AS category_name, m.created_at \
         FROM meetings m \
         LEFT JOIN meeting_categorizations mc ON m.meeting_categorization_by_ai_id = mc.id",
    );
    let term = stmt.bind(p.search_term.as_str());
    let limit = stmt.bind(p.limit);
    stmt.push_sql(&format!(
        " WHERE m.fireflies_transcript ILIKE '%' || {term} || '%' \
         OR m.fireflies_meeting_summary ILIKE '%' || {term} || '%' \
         OR m.fireflies_title ILIKE '%' || {term} || '%' \
         ORDER BY m.fireflies_timestamp DESC LIMIT {limit}"
    ));
    stmt
}

#[derive(Debug, Deserialize)]
struct EmailParams {
    fireflies_id: Option<String>,
    #[serde(default = "default_limit_50")]
    limit: i64,
}

fn ai_generated_emails(p: &EmailParams) -> Statement {
    let mut stmt = Statement::query(
        "SELECT e.id, e.fireflies_id, e.generated_email_subject, e.generated_email_body, \
         e.recipients, e.senders, e.language, e.created_at, \
         m.fireflies_title, m.fireflies_timestamp \
         FROM emails e \
         LEFT JOIN meetings m ON e.fireflies_id = m.fireflies_id \
         WHERE 1=1",
    );
    if let Some(id) = &p.fireflies_id {
        let ph = stmt.bind(id.as_str());
        stmt.push_sql(&format!(" AND e.fireflies_id = {ph}"));
    }
    let ph = stmt.bind(p.limit);
    stmt.push_sql(&format!(" ORDER BY e.created_at DESC LIMIT {ph}"));
    stmt
}

#[derive(Debug, Deserialize)]
struct ParticipantParams {
    participant: String,
    #[serde(default = "default_limit_50")]
    limit: i64,
}

fn meetings_by_participant(p: &ParticipantParams) -> Statement {
    let mut stmt = Statement::query(MEETING_COLUMNS);
    let who = stmt.bind(p.participant.as_str());
    let limit = stmt.bind(p.limit);
    stmt.push_sql(&format!(
        " WHERE m.contacts_name_and_email::text ILIKE '%' || {who} || '%' \
         ORDER BY m.fireflies_timestamp DESC LIMIT {limit}"
    ));
    stmt
}

#[derive(Debug, Deserialize)]
struct CategoriesParams {
    assessment_type: Option<AssessmentType>,
}

fn meeting_categories(p: &CategoriesParams) -> Statement {
    let mut stmt = Statement::query(
        "SELECT mc.name AS category_name, mc.assessment_type, COUNT(*) AS usage_count \
         FROM meeting_categorizations mc WHERE 1=1",
    );
    if let Some(kind) = p.assessment_type {
        let ph = stmt.bind(kind.as_str());
        stmt.push_sql(&format!(" AND mc.assessment_type = {ph}"));
    }
    stmt.push_sql(" GROUP BY mc.name, mc.assessment_type ORDER BY usage_count DESC");
    stmt
}

#[derive(Debug, Deserialize)]
struct FirefliesIdParams {
    fireflies_id: String,
}

fn meeting_by_fireflies_id(p: &FirefliesIdParams) -> Statement {
    let mut stmt = Statement::query(
        "SELECT m.id, m.fireflies_id, m.fireflies_title, m.fireflies_timestamp, \
         m.fireflies_meeting_summary, m.fireflies_transcript, m.contacts_name_and_email, \
         m.meeting_categorization_by_ai_id, mc.name AS category_name, mc.assessment_type, \
         mc.meeting_category_rationale, m.created_at, m.updated_at \
         FROM meetings m \
         LEFT JOIN meeting_categorizations mc ON m.meeting_categorization_by_ai_id = mc.id",
    );
    let ph = stmt.bind(p.fireflies_id.as_str());
    stmt.push_sql(&format!(" WHERE m.fireflies_id = {ph}"));
    stmt
}

#[derive(Debug, Deserialize)]
struct RecentParams {
    #[serde(default = "default_days_back")]
    days_back: i64,
    #[serde(default = "default_limit_50")]
    limit: i64,
}

fn default_days_back() -> i64 {
    7
}

fn recent_meetings(p: &RecentParams) -> Statement {
    let mut stmt = Statement::query(MEETING_COLUMNS);
    let days = stmt.bind(p.days_back);
    let limit = stmt.bind(p.limit);
    stmt.push_sql(&format!(
        " WHERE m.fireflies_timestamp >= NOW() - make_interval(days => {days}::int) \
         ORDER BY m.fireflies_timestamp DESC LIMIT {limit}"
    ));
    stmt
}

#[derive(Debug, Deserialize)]
struct ContactsParams {
    #[serde(default = "default_contacts_limit")]
    limit: i64,
}

fn default_contacts_limit() -> i64 {
    100
}

fn external_contacts(p: &ContactsParams) -> Statement {
    let mut stmt = Statement::query(
        "SELECT m.contacts_name_and_email, COUNT(*) AS meeting_count, \
         MAX(m.fireflies_timestamp) AS last_meeting_date, \
         ARRAY_AGG(DISTINCT mc.name) FILTER (WHERE mc.name IS NOT NULL) AS categories \
         FROM meetings m \
         LEFT JOIN meeting_categorizations mc ON m.meeting_categorization_by_ai_id = mc.id \
         WHERE mc.assessment_type = 'External' AND m.contacts_name_and_email IS NOT NULL \
         GROUP BY m.contacts_name_and_email \
         ORDER BY meeting_count DESC",
    );
    let ph = stmt.bind(p.limit);
    stmt.push_sql(&format!(" LIMIT {ph}"));
    stmt
}

#[derive(Debug, Deserialize)]
struct NoParams {}

fn user_list(_: &NoParams) -> Statement {
    Statement::query("SELECT id, email, created_at FROM users ORDER BY created_at DESC")
}

// =============================================================================
// MEETING STATISTICS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StatsGrouping {
    Category,
    Month,
    AssessmentType,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatsSection {
    Category,
    Month,
    AssessmentType,
}

impl StatsGrouping {
    fn sections(self) -> &'static [StatsSection] {
        match self {
            StatsGrouping::Category => &[StatsSection::Category],
            StatsGrouping::Month => &[StatsSection::Month],
            StatsGrouping::AssessmentType => &[StatsSection::AssessmentType],
            StatsGrouping::All => &[
                StatsSection::Category,
                StatsSection::Month,
                StatsSection::AssessmentType,
            ],
        }
    }
}

impl StatsSection {
    fn key(self) -> &'static str {
        match self {
            StatsSection::Category => "by_category",
            StatsSection::Month => "by_month",
            StatsSection::AssessmentType => "by_assessment_type",
        }
    }

    fn statement(self) -> Statement {
        match self {
            StatsSection::Category => Statement::query(
                "SELECT mc.name AS category_name, mc.assessment_type, COUNT(*) AS meeting_count \
                 FROM meetings m \
                 LEFT JOIN meeting_categorizations mc ON m.meeting_categorization_by_ai_id = mc.id \
                 GROUP BY mc.name, mc.assessment_type \
                 ORDER BY meeting_count DESC",
            ),
            StatsSection::Month => Statement::query(
                "SELECT DATE_TRUNC('month', m.fireflies_timestamp) AS month, \
                 COUNT(*) AS meeting_count, COUNT(DISTINCT m.fireflies_id) AS unique_meetings \
                 FROM meetings m \
                 GROUP BY month \
                 ORDER BY month DESC",
            ),
            StatsSection::AssessmentType => Statement::query(
                "SELECT mc.assessment_type, COUNT(*) AS meeting_count \
                 FROM meetings m \
                 LEFT JOIN meeting_categorizations mc ON m.meeting_categorization_by_ai_id = mc.id \
                 GROUP BY mc.assessment_type \
                 ORDER BY meeting_count DESC",
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatsParams {
    #[serde(default)]
    group_by: StatsGrouping,
}

/// Runs one statement per requested section.
struct MeetingStats {
    context: ToolContext,
}

#[async_trait]
impl ToolHandler for MeetingStats {
    async fn call(&self, arguments: Arguments) -> Result<ToolOutput, ToolError> {
        let params: StatsParams = parse_params("get_meeting_stats", &arguments)?;
        let project = self.context.project_for(&arguments).await?;

        let mut data = Map::new();
        for section in params.group_by.sections() {
            let rows = self
                .context
                .platform
                .execute_query(&project, &section.statement())
                .await?;
            data.insert(section.key().to_string(), Value::Array(rows));
        }

        let keys: Vec<&str> = data.keys().map(String::as_str).collect();
        let summary = format!("Meeting statistics: {}", keys.join(", "));
        Ok(ToolOutput::new(summary, Value::Object(data)))
    }
}

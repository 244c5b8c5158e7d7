//! Pinned parameters and statement parameterization.

use crate::common::{MeetingsPlatform, compose};
use maia_core::SafetyMode;
use maia_mcp::{BoundParameters, SqlParam, inject};
use serde_json::json;

#[tokio::test]
async fn pinned_project_overrides_caller() {
    let platform = MeetingsPlatform::with_meetings(&[]);
    let registry = compose(
        platform.clone(),
        Some("maia-prod"),
        &["ask-maia"],
        SafetyMode::ReadOnly,
    );

    let tool = registry.get("get_user_list").unwrap();
    assert!(tool.input_schema()["properties"].get("project_id").is_none());

    tool.invoke(json!({"project_id": "someone-else"}))
        .await
        .unwrap();
    assert_eq!(platform.received()[0].project_id, "maia-prod");
    assert_eq!(platform.selections(), 0);
}

#[tokio::test]
async fn injection_is_idempotent() {
    let platform = MeetingsPlatform::with_meetings(&[]);
    let registry = compose(
        platform.clone(),
        Some("maia-prod"),
        &["ask-maia"],
        SafetyMode::ReadOnly,
    );
    let tool = registry.get("get_recent_meetings").unwrap().clone();

    let bound = BoundParameters::new().bind("project_id", "maia-prod");
    let twice = inject(tool.clone(), &bound);
    assert_eq!(twice.input_schema(), tool.input_schema());

    twice.invoke(json!({"project_id": "x"})).await.unwrap();
    tool.invoke(json!({})).await.unwrap();

    let received = platform.received();
    assert_eq!(received[0].project_id, "maia-prod");
    assert_eq!(received[0].sql, received[1].sql);
    assert_eq!(received[0].params, received[1].params);
}

#[tokio::test]
async fn unpinned_project_falls_back_to_selection() {
    let platform = MeetingsPlatform::with_meetings(&[]);
    let registry = compose(platform.clone(), None, &["debug"], SafetyMode::ReadOnly);
    let tool = registry.get("get_table_stats").unwrap();

    assert!(tool.input_schema()["properties"].get("project_id").is_some());

    tool.invoke(json!({})).await.unwrap();
    tool.invoke(json!({"project_id": "explicit"})).await.unwrap();

    let received = platform.received();
    assert_eq!(received[0].project_id, "default-project");
    assert_eq!(received[1].project_id, "explicit");
    assert_eq!(platform.selections(), 1);
}

#[tokio::test]
async fn quotes_never_alter_statement_text() {
    let platform = MeetingsPlatform::with_meetings(&[]);
    let registry = compose(
        platform.clone(),
        Some("p1"),
        &["ask-maia"],
        SafetyMode::ReadOnly,
    );

    let benign = "Sales Call";
    let hostile = "Sales' OR '1'='1'; DROP TABLE meetings; --";

    for term in [benign, hostile] {
        registry
            .get("get_meetings_by_category")
            .unwrap()
            .invoke(json!({"category_name": term}))
            .await
            .unwrap();
        registry
            .get("search_meeting_transcripts")
            .unwrap()
            .invoke(json!({"search_term": term}))
            .await
            .unwrap();
    }

    let received = platform.received();
    assert_eq!(received.len(), 4);
    assert_eq!(received[0].sql, received[2].sql);
    assert_eq!(received[1].sql, received[3].sql);
    assert!(received.iter().all(|r| !r.sql.contains("DROP TABLE")));
    assert_eq!(received[2].params[0], SqlParam::Text(hostile.to_string()));
}

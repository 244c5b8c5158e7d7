//! The confirmation gate, checked with a call-count spy.

use crate::common::{MUTATING_TOOLS, MeetingsPlatform, compose, valid_arguments};
use maia_core::SafetyMode;
use maia_mcp::ToolError;
use serde_json::{Value, json};

fn with_confirm(mut args: Value, confirm: Option<Value>) -> Value {
    if let Some(confirm) = confirm {
        args["confirm"] = confirm;
    }
    args
}

#[tokio::test]
async fn unconfirmed_mutations_never_reach_the_platform() {
    let platform = MeetingsPlatform::with_meetings(&[("abc", "Kickoff")]);
    let registry = compose(
        platform.clone(),
        Some("p1"),
        &["database"],
        SafetyMode::WriteEnabled,
    );

    let refusals = [
        None,
        Some(json!(false)),
        Some(json!("true")),
        Some(json!(1)),
        Some(json!(null)),
        Some(json!({"value": true})),
    ];

    for name in MUTATING_TOOLS {
        let tool = registry.get(name).unwrap();
        for confirm in refusals.iter().cloned() {
            let label = format!("{confirm:?}");
            let err = tool
                .invoke(with_confirm(valid_arguments(name), confirm))
                .await
                .unwrap_err();
            assert!(
                matches!(err, ToolError::SafetyCheck { .. }),
                "{name} with confirm={label} gave {err:?}"
            );
        }
    }

    assert_eq!(platform.call_count(), 0);
    assert_eq!(platform.selections(), 0);
    assert!(platform.contains("abc"));
}

#[tokio::test]
async fn refusal_names_the_required_confirmation() {
    let platform = MeetingsPlatform::with_meetings(&[]);
    let registry = compose(platform, None, &["database"], SafetyMode::WriteEnabled);

    let err = registry
        .get("delete_meeting")
        .unwrap()
        .invoke(json!({"fireflies_id": "abc", "confirm": false}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "SafetyCheckError");
    assert!(err.to_string().contains("PERMANENTLY DELETE"));
}

#[tokio::test]
async fn confirmed_delete_of_missing_meeting_issues_no_delete() {
    let platform = MeetingsPlatform::with_meetings(&[("other", "Standup")]);
    let registry = compose(
        platform.clone(),
        Some("p1"),
        &["database"],
        SafetyMode::WriteEnabled,
    );

    let err = registry
        .get("delete_meeting")
        .unwrap()
        .invoke(json!({"fireflies_id": "abc", "confirm": true}))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::NotFound { .. }));
    let received = platform.received();
    assert_eq!(received.len(), 1);
    assert!(received[0].read_only);
    assert!(received.iter().all(|r| !r.sql.contains("DELETE")));
    assert!(platform.contains("other"));
}

#[tokio::test]
async fn confirmed_call_runs_exactly_once() {
    let platform = MeetingsPlatform::with_meetings(&[]);
    let registry = compose(
        platform.clone(),
        Some("p1"),
        &["database"],
        SafetyMode::WriteEnabled,
    );

    let err = registry
        .get("insert_meeting_note")
        .unwrap()
        .invoke(with_confirm(
            valid_arguments("insert_meeting_note"),
            Some(json!(true)),
        ))
        .await
        .unwrap_err();

    // The note update affected no row; nothing was retried.
    assert_eq!(err.kind(), "NotFoundError");
    assert_eq!(platform.call_count(), 1);
    assert!(!platform.received()[0].read_only);
}

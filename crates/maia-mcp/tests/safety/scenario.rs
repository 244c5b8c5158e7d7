//! Compose `{database}` in write-enabled mode and walk `delete_meeting`
//! through refusal, not-found and success.

use crate::common::{MeetingsPlatform, compose};
use maia_core::SafetyMode;
use serde_json::json;

#[tokio::test]
async fn delete_meeting_end_to_end() {
    let platform = MeetingsPlatform::with_meetings(&[("xyz", "Weekly sync")]);
    let registry = compose(
        platform.clone(),
        Some("maia-prod"),
        &["database"],
        SafetyMode::WriteEnabled,
    );
    let delete = registry.get("delete_meeting").unwrap();

    // Not confirmed: refused, platform untouched.
    let err = delete
        .invoke(json!({"fireflies_id": "abc", "confirm": false}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "SafetyCheckError");
    assert_eq!(platform.call_count(), 0);

    // Confirmed, but "abc" does not exist yet.
    let err = delete
        .invoke(json!({"fireflies_id": "abc", "confirm": true}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NotFoundError");
    assert_eq!(err.to_string(), "Meeting with Fireflies ID abc not found.");
    assert_eq!(platform.call_count(), 1);

    // Confirmed against an existing meeting.
    let platform = MeetingsPlatform::with_meetings(&[("abc", "Kickoff"), ("xyz", "Weekly sync")]);
    let registry = compose(
        platform.clone(),
        Some("maia-prod"),
        &["database"],
        SafetyMode::WriteEnabled,
    );
    let out = registry
        .get("delete_meeting")
        .unwrap()
        .invoke(json!({"fireflies_id": "abc", "confirm": true}))
        .await
        .unwrap();

    assert_eq!(out.data["success"], true);
    assert_eq!(out.data["deleted_record"]["fireflies_id"], "abc");
    assert_eq!(out.data["message"], "Successfully deleted meeting: Kickoff");
    assert!(!platform.contains("abc"));
    assert!(platform.contains("xyz"));

    let received = platform.received();
    assert_eq!(received.len(), 2);
    assert!(received[0].read_only);
    assert!(!received[1].read_only);
    assert!(received.iter().all(|r| r.project_id == "maia-prod"));
}

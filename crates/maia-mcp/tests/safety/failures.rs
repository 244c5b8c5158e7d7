//! Platform failures surface as `PlatformError` and stop the call.

use crate::common::{MeetingsPlatform, compose};
use maia_core::SafetyMode;
use serde_json::json;

#[tokio::test]
async fn failed_project_selection_is_platform_error() {
    let platform = MeetingsPlatform::with_meetings(&[]);
    platform.fail_selection("auth expired");
    let registry = compose(platform.clone(), None, &["ask-maia"], SafetyMode::ReadOnly);

    let err = registry
        .get("get_user_list")
        .unwrap()
        .invoke(json!({}))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "PlatformError");
    assert!(err.to_string().contains("auth expired"), "{err}");
    assert_eq!(platform.selections(), 1);
    assert_eq!(platform.call_count(), 0);
}

#[tokio::test]
async fn failed_delete_after_precheck_is_platform_error() {
    let platform = MeetingsPlatform::with_meetings(&[("abc", "Kickoff")]);
    platform.fail_deletes("connection reset by peer");
    let registry = compose(
        platform.clone(),
        Some("maia-prod"),
        &["database"],
        SafetyMode::WriteEnabled,
    );

    let err = registry
        .get("delete_meeting")
        .unwrap()
        .invoke(json!({"fireflies_id": "abc", "confirm": true}))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "PlatformError");
    assert!(err.to_string().contains("connection reset by peer"), "{err}");

    // Existence check, then the failed delete; nothing retried.
    let received = platform.received();
    assert_eq!(received.len(), 2);
    assert!(received[0].read_only);
    assert!(received[1].sql.starts_with("DELETE FROM meetings"));
    assert!(platform.contains("abc"));
}

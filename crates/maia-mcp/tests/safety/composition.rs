//! Registry composition: groups, modes and build-time failures.

use crate::common::{MUTATING_TOOLS, MeetingsPlatform, all_group_subsets, compose};
use maia_core::{ConfigError, SafetyMode};
use maia_mcp::{ComposeError, FeatureComposer, ToolContext};

#[test]
fn read_only_registries_never_contain_mutations() {
    for groups in all_group_subsets() {
        let registry = compose(
            MeetingsPlatform::with_meetings(&[]),
            None,
            &groups,
            SafetyMode::ReadOnly,
        );
        for tool in registry.list() {
            assert!(
                !tool.is_mutation(),
                "{} is mutating in read-only registry for {:?}",
                tool.name(),
                groups
            );
        }
        for name in MUTATING_TOOLS {
            assert!(!registry.contains(name), "{name} present for {groups:?}");
        }
    }
}

#[test]
fn write_enabled_mutations_are_all_guarded() {
    for groups in all_group_subsets() {
        let registry = compose(
            MeetingsPlatform::with_meetings(&[]),
            None,
            &groups,
            SafetyMode::WriteEnabled,
        );
        for tool in registry.list().into_iter().filter(|t| t.is_mutation()) {
            assert!(tool.is_guarded(), "{} is not guarded", tool.name());
            assert!(
                tool.input_schema()["required"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .any(|r| r == "confirm"),
                "{} does not require confirm",
                tool.name()
            );
        }

        let has_database = groups.contains(&"database");
        let has_meeting_writes = has_database || groups.contains(&"ask-maia");
        for name in MUTATING_TOOLS {
            let expected = if name == "apply_migration" {
                has_database
            } else {
                has_meeting_writes
            };
            assert_eq!(registry.contains(name), expected, "{name} for {groups:?}");
        }
    }
}

#[test]
fn unknown_group_fails_before_registration() {
    let context = ToolContext::new(MeetingsPlatform::with_meetings(&[]), None);
    let err = FeatureComposer::new(context)
        .compose(["ask-maia", "storage", "debug"], SafetyMode::ReadOnly)
        .unwrap_err();

    match err {
        ComposeError::Configuration(ConfigError::UnknownFeature { name, .. }) => {
            assert_eq!(name, "storage");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tool_names_are_unique_across_groups() {
    let registry = compose(
        MeetingsPlatform::with_meetings(&[]),
        None,
        &["ask-maia", "database", "debug"],
        SafetyMode::WriteEnabled,
    );
    assert_eq!(registry.len(), 21);
    assert_eq!(registry.names().len(), registry.definitions().len());
}

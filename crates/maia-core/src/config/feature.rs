//! Feature groups and the global safety mode.
//!
//! Both are closed enums. Anything outside the known set is rejected with a
//! [`ConfigError`] at startup instead of being ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::ConfigError;

/// A named bundle of tools that is enabled or disabled as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureGroup {
    /// Meeting, email and user queries (plus meeting edits in write mode, via `database`).
    AskMaia,
    /// Schema inspection, read-only SQL, migrations and record mutations.
    Database,
    /// Connection and table statistics.
    Debug,
}

impl FeatureGroup {
    /// Every known feature group, in composition order.
    pub const ALL: [FeatureGroup; 3] = [
        FeatureGroup::AskMaia,
        FeatureGroup::Database,
        FeatureGroup::Debug,
    ];

    /// The configuration name of this group.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureGroup::AskMaia => "ask-maia",
            FeatureGroup::Database => "database",
            FeatureGroup::Debug => "debug",
        }
    }

    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureGroup {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownFeature {
                name: s.to_string(),
                expected: Self::expected(),
            })
    }
}

/// Parse a list of feature-group names.
///
/// Names must match exactly; fails on the first unrecognized one. Duplicates
/// collapse.
pub fn parse_feature_groups<I, S>(names: I) -> Result<BTreeSet<FeatureGroup>, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().parse::<FeatureGroup>())
        .collect()
}

/// Process-wide write policy, fixed when the server is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SafetyMode {
    /// Only read tools are composed.
    #[default]
    ReadOnly,
    /// Read and write tools are composed; writes need `confirm: true`.
    WriteEnabled,
}

impl SafetyMode {
    /// The configuration name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyMode::ReadOnly => "read-only",
            SafetyMode::WriteEnabled => "write-enabled",
        }
    }

    /// Whether write providers are composed.
    pub fn allows_writes(&self) -> bool {
        *self == SafetyMode::WriteEnabled
    }
}

impl fmt::Display for SafetyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafetyMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "read-only" => Ok(SafetyMode::ReadOnly),
            "write-enabled" => Ok(SafetyMode::WriteEnabled),
            other => Err(ConfigError::InvalidSafetyMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for SafetyMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SafetyMode> for String {
    fn from(mode: SafetyMode) -> Self {
        mode.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_groups() {
        let groups = parse_feature_groups(["ask-maia", "debug", "ask-maia"]).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.contains(&FeatureGroup::AskMaia));
        assert!(groups.contains(&FeatureGroup::Debug));
    }

    #[test]
    fn test_unknown_group_names_first_offender() {
        let err = parse_feature_groups(["database", "storage", "branching"]).unwrap_err();
        match err {
            ConfigError::UnknownFeature { name, expected } => {
                assert_eq!(name, "storage");
                assert_eq!(expected, "ask-maia, database, debug");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_group_names_are_case_sensitive() {
        assert!("Database".parse::<FeatureGroup>().is_err());
    }

    #[test]
    fn test_padded_group_name_is_unknown() {
        let err = parse_feature_groups(["ask-maia", " database "]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownFeature { name, .. } if name == " database "
        ));
    }

    #[test]
    fn test_safety_mode_parse() {
        assert_eq!("read-only".parse::<SafetyMode>().unwrap(), SafetyMode::ReadOnly);
        assert_eq!(
            "write-enabled".parse::<SafetyMode>().unwrap(),
            SafetyMode::WriteEnabled
        );
        assert!(matches!(
            "yolo".parse::<SafetyMode>(),
            Err(ConfigError::InvalidSafetyMode(m)) if m == "yolo"
        ));
    }

    #[test]
    fn test_default_mode_is_read_only() {
        assert_eq!(SafetyMode::default(), SafetyMode::ReadOnly);
        assert!(!SafetyMode::default().allows_writes());
    }
}

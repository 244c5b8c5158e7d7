//! Configuration types for the Maia MCP server.
//!
//! Configuration is loaded from a single YAML file (`maia.yaml` by default):
//!
//! ```yaml
//! features: [ask-maia, database, debug]
//! mode: write-enabled
//! project_id: maia-prod
//! projects:
//!   maia-prod:
//!     database_url_env: MAIA_DATABASE_URL
//! mcp:
//!   transport: stdio
//! ```

pub mod feature;
pub mod mcp;
pub mod project;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

pub use feature::{FeatureGroup, SafetyMode, parse_feature_groups};
pub use mcp::{McpConfig, Transport};
pub use project::{ConnectionPoolConfig, ProjectConfig};

/// Complete Maia configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaiaConfig {
    /// Requested feature-group names. Validated by [`MaiaConfig::feature_groups`].
    #[serde(default = "default_features")]
    pub features: Vec<String>,

    /// Global safety mode.
    #[serde(default)]
    pub mode: SafetyMode,

    /// Project every tool is pinned to. When absent, callers may pass
    /// `project_id` themselves or the platform selects one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Known projects and how to reach their databases.
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfig>,

    /// MCP server configuration.
    #[serde(default)]
    pub mcp: McpConfig,
}

impl Default for MaiaConfig {
    fn default() -> Self {
        Self {
            features: default_features(),
            mode: SafetyMode::default(),
            project_id: None,
            projects: BTreeMap::new(),
            mcp: McpConfig::default(),
        }
    }
}

fn default_features() -> Vec<String> {
    FeatureGroup::ALL
        .iter()
        .map(|g| g.as_str().to_string())
        .collect()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown feature group '{name}' (expected one of: {expected})")]
    UnknownFeature { name: String, expected: String },

    #[error("invalid safety mode '{0}' (expected 'read-only' or 'write-enabled')")]
    InvalidSafetyMode(String),

    #[error("no database URL for project '{project}': {reason}")]
    MissingDatabaseUrl { project: String, reason: String },

    #[error("pinned project '{0}' is not listed under 'projects'")]
    UnknownPinnedProject(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MaiaConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// The validated set of enabled feature groups.
    pub fn feature_groups(&self) -> Result<BTreeSet<FeatureGroup>, ConfigError> {
        parse_feature_groups(&self.features)
    }

    /// Check the configuration for errors that would only surface later.
    ///
    /// Does not read environment variables; URL resolution happens when the
    /// platform is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.feature_groups()?;

        if let Some(pinned) = &self.project_id {
            if !self.projects.is_empty() && !self.projects.contains_key(pinned) {
                return Err(ConfigError::UnknownPinnedProject(pinned.clone()));
            }
        }

        Ok(())
    }
}

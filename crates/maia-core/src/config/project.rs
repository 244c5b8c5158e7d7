//! Project (database) connection configuration.
//!
//! Each project maps to one Postgres database. The connection URL comes from
//! an environment variable (preferred, keeps secrets out of the file) or is
//! given inline.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Connection settings for a single project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Environment variable holding the connection URL. Highest precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url_env: Option<String>,

    /// Full connection URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Connection pool configuration.
    #[serde(default)]
    pub pool: ConnectionPoolConfig,
}

impl ProjectConfig {
    /// Resolve the connection URL for the project named `project`.
    pub fn resolve_database_url(&self, project: &str) -> Result<String, ConfigError> {
        if let Some(var) = &self.database_url_env {
            if let Ok(url) = std::env::var(var) {
                if !url.trim().is_empty() {
                    return Ok(url);
                }
            }
            if self.database_url.is_none() {
                return Err(ConfigError::MissingDatabaseUrl {
                    project: project.to_string(),
                    reason: format!("environment variable '{}' is not set", var),
                });
            }
        }

        self.database_url
            .clone()
            .ok_or_else(|| ConfigError::MissingDatabaseUrl {
                project: project.to_string(),
                reason: "neither database_url_env nor database_url is configured".to_string(),
            })
    }
}

/// Connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionPoolConfig {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Timeout in seconds when acquiring a connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    30
}

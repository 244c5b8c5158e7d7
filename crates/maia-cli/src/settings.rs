//! Configuration loading shared by the subcommands.
//!
//! The YAML file is read first; command-line flags (or their `MAIA_*`
//! environment variables) then replace individual fields.

use anyhow::{Context, Result};
use clap::Args;
use maia_core::{MaiaConfig, SafetyMode};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Config file location plus the overrides every subcommand accepts.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = "maia.yaml", env = "MAIA_CONFIG")]
    pub config: PathBuf,

    /// Comma-separated feature groups (ask-maia, database, debug). Overrides config file.
    #[arg(long, value_delimiter = ',', env = "MAIA_FEATURES")]
    pub features: Option<Vec<String>>,

    /// Safety mode: read-only or write-enabled. Overrides config file.
    #[arg(long, env = "MAIA_MODE")]
    pub mode: Option<SafetyMode>,
}

impl ConfigArgs {
    /// Read the config file (defaults when it does not exist) and apply overrides.
    pub fn load(&self) -> Result<MaiaConfig> {
        let mut config = read_config(&self.config, false)?;
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut MaiaConfig) {
        if let Some(features) = &self.features {
            config.features = features.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
    }
}

/// Read a config file. A missing file is an error only when `required`.
pub fn read_config(path: &Path, required: bool) -> Result<MaiaConfig> {
    if !path.exists() {
        if required {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        warn!(config = %path.display(), "Config file not found, using defaults");
        return Ok(MaiaConfig::default());
    }

    MaiaConfig::from_file(path)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}

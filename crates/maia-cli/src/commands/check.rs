//! `maia check`: validate the configuration before serving.
//!
//! Checks run offline. Database URLs are resolved (environment variables
//! included) but no connection is opened.

use anyhow::Result;
use clap::Args;
use maia_adapter_pg::PostgresPlatform;
use maia_core::{MaiaConfig, SafetyMode};
use std::path::PathBuf;

use crate::offline;
use crate::settings::read_config;

/// Arguments for `maia check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = "maia.yaml", env = "MAIA_CONFIG")]
    pub config: PathBuf,
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFinding {
    pub passed: bool,
    pub category: &'static str,
    pub message: String,
}

impl CheckFinding {
    fn pass(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            passed: true,
            category,
            message: message.into(),
        }
    }

    fn fail(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            category,
            message: message.into(),
        }
    }
}

/// Run every check against a loaded configuration.
pub fn run_checks(config: &MaiaConfig) -> Vec<CheckFinding> {
    let mut findings = Vec::new();

    match config.validate() {
        Ok(()) => findings.push(CheckFinding::pass(
            "config",
            format!("features: {}", config.features.join(", ")),
        )),
        Err(e) => findings.push(CheckFinding::fail("config", e.to_string())),
    }

    for mode in [SafetyMode::ReadOnly, SafetyMode::WriteEnabled] {
        let category = match mode {
            SafetyMode::ReadOnly => "compose read-only",
            SafetyMode::WriteEnabled => "compose write-enabled",
        };
        match offline::compose(config, mode) {
            Ok(registry) => {
                let guarded = registry.list().iter().filter(|t| t.is_guarded()).count();
                findings.push(CheckFinding::pass(
                    category,
                    format!("{} tools ({} require confirmation)", registry.len(), guarded),
                ));
            }
            Err(e) => findings.push(CheckFinding::fail(category, e.to_string())),
        }
    }

    if config.projects.is_empty() {
        findings.push(CheckFinding::fail("projects", "no projects are configured"));
    } else {
        let mut resolved = true;
        for (name, project) in &config.projects {
            match project.resolve_database_url(name) {
                Ok(_) => findings.push(CheckFinding::pass(
                    "projects",
                    format!("{name}: database URL resolved"),
                )),
                Err(e) => {
                    resolved = false;
                    findings.push(CheckFinding::fail("projects", e.to_string()));
                }
            }
        }
        // Catches malformed URLs; pools are lazy so nothing connects.
        if resolved {
            if let Err(e) = PostgresPlatform::from_config(config) {
                findings.push(CheckFinding::fail("projects", e.to_string()));
            }
        }
    }

    findings
}

pub fn execute(args: CheckArgs) -> Result<()> {
    println!("🔍 Checking Maia configuration ({})...", args.config.display());
    println!();

    let config = read_config(&args.config, true)?;
    let findings = run_checks(&config);

    for finding in &findings {
        let icon = if finding.passed { "✅" } else { "❌" };
        println!("  {} [{}] {}", icon, finding.category, finding.message);
    }

    let failures = findings.iter().filter(|f| !f.passed).count();
    println!();
    println!("{}", "═".repeat(60));
    if failures == 0 {
        println!("✅ All checks passed!");
        Ok(())
    } else {
        anyhow::bail!("Configuration check failed with {failures} error(s)");
    }
}

//! Feature composer: turns enabled feature groups and the safety mode into a
//! tool registry.
//!
//! | Group      | Read provider       | Write provider (write-enabled only)      |
//! |------------|---------------------|------------------------------------------|
//! | `ask-maia` | ask-maia read tools | ask-maia write tools                     |
//! | `database` | database read tools | ask-maia write tools, database write tools |
//! | `debug`    | debugging tools     | none                                     |
//!
//! The ask-maia write tools are composed once when either group asks for them.
//! In read-only mode write providers are never called, so mutating tools are
//! absent from the registry rather than refused at call time.

use std::collections::BTreeSet;

use maia_core::{FeatureGroup, SafetyMode, parse_feature_groups};

use crate::confirmation::guard;
use crate::descriptor::ToolDescriptor;
use crate::error::ComposeError;
use crate::registry::ToolRegistry;
use crate::tools::{ToolContext, ask_maia, ask_maia_write, database, debug};

/// Builds the registry for one server instance.
#[derive(Clone)]
pub struct FeatureComposer {
    context: ToolContext,
}

impl FeatureComposer {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }

    /// Validate feature names, then compose.
    ///
    /// Every name is checked before any tool is built.
    pub fn compose<I, S>(&self, requested: I, mode: SafetyMode) -> Result<ToolRegistry, ComposeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let groups = parse_feature_groups(requested)?;
        self.compose_groups(&groups, mode)
    }

    /// Compose an already validated set of groups.
    pub fn compose_groups(
        &self,
        groups: &BTreeSet<FeatureGroup>,
        mode: SafetyMode,
    ) -> Result<ToolRegistry, ComposeError> {
        let mut registry = ToolRegistry::new();

        for group in groups {
            for tool in self.read_tools(*group) {
                registry.register(tool)?;
            }
        }
        if mode.allows_writes() {
            for tool in self.write_tools(groups) {
                registry.register(guard(tool))?;
            }
        }

        tracing::info!(
            groups = ?groups.iter().map(FeatureGroup::as_str).collect::<Vec<_>>(),
            mode = %mode,
            tools = registry.len(),
            "Composed tool registry"
        );
        Ok(registry)
    }

    fn read_tools(&self, group: FeatureGroup) -> Vec<ToolDescriptor> {
        match group {
            FeatureGroup::AskMaia => ask_maia::read_tools(&self.context),
            FeatureGroup::Database => database::read_tools(&self.context),
            FeatureGroup::Debug => debug::read_tools(&self.context),
        }
    }

    fn write_tools(&self, groups: &BTreeSet<FeatureGroup>) -> Vec<ToolDescriptor> {
        let mut tools = Vec::new();
        if groups.contains(&FeatureGroup::AskMaia) || groups.contains(&FeatureGroup::Database) {
            tools.extend(ask_maia_write::write_tools(&self.context));
        }
        if groups.contains(&FeatureGroup::Database) {
            tools.extend(database::write_tools(&self.context));
        }
        tools
    }
}

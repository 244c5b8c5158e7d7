//! Tool registry for MCP tools.
//!
//! Filled once by the feature composer and read-only afterwards.

use std::collections::BTreeMap;

use crate::descriptor::ToolDescriptor;
use crate::error::ComposeError;
use crate::protocol::ToolDefinition;

/// Registry of available MCP tools, keyed by name.
#[derive(Clone, Default, Debug)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// Fails on a duplicate name, and on a mutating tool that is not wrapped
    /// by the confirmation gate.
    pub fn register(&mut self, tool: ToolDescriptor) -> Result<(), ComposeError> {
        if tool.is_mutation() && !tool.is_guarded() {
            return Err(ComposeError::UnguardedMutation {
                name: tool.name().to_string(),
            });
        }
        if self.tools.contains_key(tool.name()) {
            return Err(ComposeError::DuplicateTool {
                name: tool.name().to_string(),
            });
        }
        self.tools.insert(tool.name().to_string(), tool);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tools, ordered by name.
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().collect()
    }

    /// Wire definitions for `tools/list`.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition().clone()).collect()
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

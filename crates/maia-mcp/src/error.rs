//! Error types for the MCP crate.

use maia_core::ConfigError;
use serde_json::{Value, json};
use thiserror::Error;

/// Failure reported by the platform port (network, auth, query error).
///
/// The message is the platform's own, unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PlatformError {
    pub message: String,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors produced by a single tool call.
///
/// A tool error never affects other calls; it is reported back to the caller
/// as the result of that call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// A mutating call arrived without `confirm: true`. Nothing was executed.
    #[error("{message}")]
    SafetyCheck { tool: String, message: String },

    /// The mutation target does not exist.
    #[error("{message}")]
    NotFound { message: String },

    /// The platform port failed.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Input does not match the tool's declared shape.
    #[error("invalid arguments for tool {tool}: {reason}")]
    Validation { tool: String, reason: String },
}

impl ToolError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ToolError::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolError::Validation {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Stable error kind reported to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::SafetyCheck { .. } => "SafetyCheckError",
            ToolError::NotFound { .. } => "NotFoundError",
            ToolError::Platform(_) => "PlatformError",
            ToolError::Validation { .. } => "ValidationError",
        }
    }

    /// Error object returned in the tool result.
    pub fn to_json(&self) -> Value {
        json!({
            "kind": self.kind(),
            "message": self.to_string(),
        })
    }
}

/// Build-time failures of the tool registry.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Unknown feature group or invalid safety mode.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Two providers declared the same tool name.
    #[error("tool '{name}' is declared more than once")]
    DuplicateTool { name: String },

    /// A mutating tool reached the registry without the confirmation gate.
    #[error("mutating tool '{name}' is not wrapped by the confirmation gate")]
    UnguardedMutation { name: String },
}

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Tool registry could not be built.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// Transport error.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

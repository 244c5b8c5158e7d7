//! # maia-mcp
//!
//! MCP (Model Context Protocol) server exposing the Maia meeting database to
//! AI agents as typed tools.
//!
//! - **Feature groups**: `ask-maia`, `database` and `debug` select which tools
//!   are composed into the registry.
//! - **Safety mode**: in `read-only` mode mutating tools are never built; in
//!   `write-enabled` mode each one is wrapped by the confirmation gate and runs
//!   only with `confirm: true`.
//! - **Project pinning**: a configured project id is injected into every tool
//!   and hidden from its schema.
//! - **Transports**: stdio and HTTP.
//!
//! ## Architecture
//!
//! ```text
//! AI Agent
//!       │
//!       │ MCP protocol (tools/list, tools/call)
//!       ▼
//! ┌────────────────────────────┐
//! │  McpServer                 │
//! │  ToolRegistry              │  ← FeatureComposer(groups, mode)
//! │    Gate                    │  ← confirm: true or SafetyCheckError
//! │      Injected              │  ← pinned project_id
//! │        Validated(Leaf)     │  ← JSON schema
//! └─────────────┬──────────────┘
//!               │ Statement { sql, $n params }
//!               ▼
//!     Platform (maia-adapter-pg)
//! ```
//!
//! ## Example Usage
//!
//! ```ignore
//! use maia_core::{McpConfig, SafetyMode};
//! use maia_mcp::{FeatureComposer, McpServer, ToolContext};
//!
//! let context = ToolContext::new(platform.clone(), Some("maia-prod".into()));
//! let tools = FeatureComposer::new(context)
//!     .compose(["ask-maia", "database"], SafetyMode::WriteEnabled)?;
//!
//! McpServer::new(McpConfig::default(), tools, platform).run().await?;
//! ```

pub mod composer;
pub mod confirmation;
pub mod descriptor;
pub mod error;
pub mod http_transport;
pub mod injector;
pub mod platform;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod statement;
pub mod tools;
pub mod validator;

#[cfg(test)]
mod testing;

// Re-export main types
pub use composer::FeatureComposer;
pub use confirmation::{GateState, guard};
pub use descriptor::{
    AffectedRecord, Arguments, Confirmation, MutationOutcome, ToolDescriptor, ToolHandler,
    ToolKind, ToolOutput,
};
pub use error::{ComposeError, McpError, PlatformError, ToolError};
pub use injector::{BoundParameters, inject};
pub use platform::{Platform, SessionInfo, resolve_project};
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ToolAnnotations,
    ToolContent, ToolDefinition,
};
pub use registry::ToolRegistry;
pub use server::McpServer;
pub use statement::{SqlParam, Statement, StatementShape};
pub use tools::ToolContext;

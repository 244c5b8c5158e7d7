//! # maia-core
//!
//! Configuration types shared by the Maia crates.
//!
//! The server is configured once at startup from `maia.yaml` (optionally
//! overridden on the command line). The resulting [`MaiaConfig`] is never
//! mutated afterwards: the feature set, the safety mode and the pinned project
//! are passed by value to the components that need them.

pub mod config;

pub use config::{
    ConfigError, ConnectionPoolConfig, FeatureGroup, MaiaConfig, McpConfig, ProjectConfig,
    SafetyMode, Transport, parse_feature_groups,
};

//! Subcommand implementations for the `maia` binary.

pub mod check;
pub mod serve;
pub mod tools;

//! Tooling & Integration Layer
//!
//! Command-line entry points that drive bootstrap, page events and
//! inspection against a sled-backed menu store.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};

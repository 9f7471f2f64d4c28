// Library exports for the pane-mcp binary and integration tests.
//
// The protocol-independent pieces (pane addressing, dispatch, result
// envelopes, text formatting) live in `pane-mcp-core`; the stdio JSON-RPC
// server and the subprocess terminal client live in `pane-mcp-server`.
// This crate adds configuration, logging and the command line.

/// Application version (root crate version, for use by sub-crates).
/// Sub-crates should receive this via parameter rather than using
/// `env!("CARGO_PKG_VERSION")` which resolves to the sub-crate's version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod debug;

//! CLI module for egov-laws-mcp - command-line interface and subcommands.
//!
//! Serving over stdio is the default; `tools` and `call` exercise the
//! catalog and dispatcher without an MCP client.

pub mod commands;

pub use commands::Cli;

//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - serve: run the MCP server on stdio (default)
//! - tools: print the tool catalog
//! - call: run a single tool call and print its payload

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// egov-laws-mcp - MCP server for the e-Gov law API
#[derive(Parser, Debug)]
#[command(name = "egov-laws-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Law API base URL, overriding config and environment
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Serve MCP over stdin/stdout
    Serve,

    /// List the available tools
    Tools {
        /// Print the catalog as tools/list JSON
        #[arg(long)]
        json: bool,
    },

    /// Call one tool and print its payload
    Call {
        /// Tool name, e.g. list_laws
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,
    },
}

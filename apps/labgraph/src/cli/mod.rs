//! # labgraph CLI Module
//!
//! This module implements the CLI interface for labgraph.
//!
//! ## Available Commands
//!
//! - `init` - Initialize a new database
//! - `status` - Show graph status
//! - `populate` - Load the three-layer demo graph
//! - `node` - Create a node
//! - `relate` - Create a relationship between two keyed nodes
//! - `set` - Set attributes on a keyed node
//! - `route` - Find the shortest route between two keyed nodes
//! - `rels` - List the relationships of a keyed node
//! - `export` - Export graph to file
//! - `import` - Import graph from file

mod commands;

use crate::config::{Backend, Config};
use clap::{Parser, Subcommand, ValueEnum};
use labgraph_core::{Direction, GraphError};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// labgraph - labeled graph store with breadth-first route search
#[derive(Parser, Debug)]
#[command(name = "labgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to ./labgraph.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the graph database
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Relationship direction for `rels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Outgoing,
    Incoming,
    Both,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Outgoing => Direction::Outgoing,
            DirectionArg::Incoming => Direction::Incoming,
            DirectionArg::Both => Direction::Both,
        }
    }
}

/// Snapshot encoding for `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Header + postcard payload, readable by the file backend.
    Binary,
    /// Pretty-printed JSON.
    Json,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show graph status
    Status,

    /// Create the demo graph (A 1..5, B 11..55, C 111..555)
    Populate,

    /// Create a node
    Node {
        /// Node label
        #[arg(short, long)]
        label: String,

        /// Attributes as key=value (repeatable)
        #[arg(short, long = "attr")]
        attributes: Vec<String>,
    },

    /// Create a relationship between two keyed nodes
    Relate {
        /// Source label
        #[arg(long)]
        from_label: String,

        /// Source key
        #[arg(long)]
        from: String,

        /// Target label
        #[arg(long)]
        to_label: String,

        /// Target key
        #[arg(long)]
        to: String,

        /// Relationship type
        #[arg(short = 't', long = "type")]
        rel_type: String,
    },

    /// Set attributes on a keyed node
    Set {
        /// Node label
        #[arg(short, long)]
        label: String,

        /// Node key
        #[arg(short, long)]
        key: String,

        /// Attributes as key=value (repeatable)
        #[arg(short, long = "attr", required = true)]
        attributes: Vec<String>,
    },

    /// Find the shortest route between two keyed nodes (Ctrl-C cancels)
    Route {
        /// Start label
        #[arg(long)]
        from_label: String,

        /// Start key
        #[arg(long)]
        from: String,

        /// Goal label
        #[arg(long)]
        to_label: String,

        /// Goal key
        #[arg(long)]
        to: String,
    },

    /// List the relationships of a keyed node
    Rels {
        /// Node label
        #[arg(short, long)]
        label: String,

        /// Node key
        #[arg(short, long)]
        key: String,

        /// Which relationships to list
        #[arg(short, long, value_enum, default_value = "outgoing")]
        direction: DirectionArg,
    },

    /// Export graph snapshot
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format
        #[arg(short = 't', long, value_enum, default_value = "binary")]
        format: ExportFormat,
    },

    /// Import graph snapshot (file backend only)
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute a parsed command against the resolved configuration.
pub async fn execute(
    command: Option<Commands>,
    config: &Config,
    json_mode: bool,
) -> Result<(), GraphError> {
    match command {
        Some(Commands::Init { force }) => cmd_init(config, force),
        Some(Commands::Status) => cmd_status(config, json_mode),
        Some(Commands::Populate) => cmd_populate(config, json_mode),
        Some(Commands::Node { label, attributes }) => {
            cmd_node(config, json_mode, &label, &attributes)
        }
        Some(Commands::Relate {
            from_label,
            from,
            to_label,
            to,
            rel_type,
        }) => cmd_relate(
            config,
            json_mode,
            (from_label.as_str(), from.as_str()),
            (to_label.as_str(), to.as_str()),
            &rel_type,
        ),
        Some(Commands::Set {
            label,
            key,
            attributes,
        }) => cmd_set(config, json_mode, (label.as_str(), key.as_str()), &attributes),
        Some(Commands::Route {
            from_label,
            from,
            to_label,
            to,
        }) => cmd_route(config, json_mode, (from_label, from), (to_label, to)).await,
        Some(Commands::Rels {
            label,
            key,
            direction,
        }) => cmd_rels(config, json_mode, &label, &key, direction.into()),
        Some(Commands::Export { output, format }) => cmd_export(config, &output, format),
        Some(Commands::Import { input }) => cmd_import(config, &input),
        None => {
            // No subcommand - show status by default
            cmd_status(config, json_mode)
        }
    }
}

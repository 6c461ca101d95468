//! # labgraph
//!
//! Library half of the labgraph binary: CLI definitions, command
//! implementations and configuration loading. `main.rs` only wires up
//! tracing and dispatches.

pub mod cli;
pub mod config;

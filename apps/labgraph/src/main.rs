//! # labgraph
//!
//! The command-line binary for the labgraph store.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │          apps/labgraph (THE BINARY)        │
//! │                                            │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  │
//! │  │   CLI    │  │  Config  │  │ Tracing  │  │
//! │  │  (clap)  │  │  (toml)  │  │ (subscr.)│  │
//! │  └────┬─────┘  └────┬─────┘  └──────────┘  │
//! │       └──────┬──────┘                      │
//! │              ▼                             │
//! │      ┌────────────────┐                    │
//! │      │ labgraph-core  │                    │
//! │      │  (THE ENGINE)  │                    │
//! │      └────────────────┘                    │
//! └────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! labgraph init
//! labgraph populate
//! labgraph route --from-label A --from 1 --to-label C --to 111
//! labgraph rels -l A -k 1 --direction both
//! ```

use clap::Parser;
use labgraph::cli;
use labgraph::config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing. LABGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("LABGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "labgraph=info,labgraph_core=info".into());

    // Logs go to stderr so stdout stays clean for command output.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config.with_cli(cli.database, cli.backend),
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli.command, &config, cli.json_mode).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  labgraph v{}
  labeled graph store · breadth-first routes
"#,
        env!("CARGO_PKG_VERSION")
    );
}

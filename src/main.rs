//! api-routes
//!
//! Serves file-convention API handlers over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!   startup                                   per request
//!   ───────                                   ───────────
//!   discovery (catalog | manifest | dir)      Client Request
//!        │                                        │
//!        ▼                                        ▼
//!   handler catalog ── load ──┐              http server (request id, trace, limits)
//!                             ▼                   │
//!   routing: parse patterns → route table ──▶ snapshot.resolve(path)
//!                             ▲                   │
//!   watcher (dev) ── rebuild ─┘                   ▼
//!                                            dispatch ─▶ handler
//!                                                 │
//!                                                 ▼
//!                                   200 / 404 / 405 / 500 / 504
//! ```

mod demo_handlers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use api_routes::config::{load_config, RouterConfig};
use api_routes::lifecycle::{self, build_route_table};
use api_routes::observability::logging;
use api_routes::routing::MatchResult;

#[derive(Parser)]
#[command(name = "api-routes")]
#[command(about = "Serve file-convention API routes", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Print the route table in match order
    Routes,
    /// Show which route a path resolves to
    Resolve {
        /// Request path, e.g. /blog/42
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    logging::init(&config.observability)?;
    let catalog = demo_handlers::catalog();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!(
                bind_address = %config.listener.bind_address,
                mount_prefix = %config.routes.mount_prefix,
                discovery = ?config.discovery.source,
                "api-routes v{} starting",
                env!("CARGO_PKG_VERSION")
            );
            lifecycle::run(config, catalog).await?;
        }
        Commands::Routes => {
            let table = build_route_table(&config, &catalog)?;
            for entry in table.entries() {
                println!(
                    "{:<32} {:<40} {}",
                    table.mounted_path(entry),
                    entry.identifier,
                    entry.methods()
                );
            }
        }
        Commands::Resolve { path } => {
            let table = build_route_table(&config, &catalog)?;
            match table.resolve(&path) {
                MatchResult::Matched(matched) => {
                    println!("route:   {}", table.mounted_path(&matched.entry));
                    println!("handler: {}", matched.entry.identifier);
                    println!("methods: {}", matched.entry.methods());
                    println!("params:  {}", serde_json::to_string(&matched.params)?);
                }
                MatchResult::NoMatch => println!("no match for {}", path),
            }
        }
    }

    Ok(())
}

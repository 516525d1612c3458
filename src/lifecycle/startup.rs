//! Startup orchestration.
//!
//! # Responsibilities
//! - Discover handlers and bind them to catalog modules
//! - Build the route table (reject malformed, ambiguous, reserved routes)
//! - Bind the listener and hand over to the HTTP server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The same build path is reused by the development watcher

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{ConfigError, RouterConfig};
use crate::discovery::{self, DiscoveryError, RouteWatcher};
use crate::handler::{CatalogError, HandlerCatalog};
use crate::http::HttpServer;
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::routing::{RouteTable, RouteTableError, RouteTableHandle};

/// Anything that prevents the router from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Routes(#[from] RouteTableError),

    #[error("invalid address {0}")]
    Address(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to watch handler sources: {0}")]
    Watch(#[from] notify::Error),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Discover, load and compile the route table for `config`.
pub fn build_route_table(
    config: &RouterConfig,
    catalog: &HandlerCatalog,
) -> Result<RouteTable, StartupError> {
    let discovered = discovery::discover(&config.discovery, catalog)?;
    let loaded = catalog.load(&discovered)?;
    let table = RouteTable::build(loaded, &config.routes)?;
    Ok(table)
}

fn parse_addr(value: &str) -> Result<SocketAddr, StartupError> {
    value
        .parse()
        .map_err(|_| StartupError::Address(value.to_string()))
}

/// Run the router until a shutdown signal arrives.
pub async fn run(config: RouterConfig, catalog: HandlerCatalog) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        metrics::init_metrics(parse_addr(&config.observability.metrics_address)?)?;
    }

    let table = build_route_table(&config, &catalog)?;
    for entry in table.entries() {
        tracing::info!(
            route = %table.mounted_path(entry),
            identifier = %entry.identifier,
            methods = %entry.methods(),
            "Route registered"
        );
    }
    let routes = Arc::new(RouteTableHandle::new(table));

    // Dropping the notify watcher stops it, so it lives until shutdown.
    let _watcher = if config.discovery.watch {
        Some(RouteWatcher::new(config.clone(), catalog, routes.clone())?.run()?)
    } else {
        None
    };

    let addr = parse_addr(&config.listener.bind_address)?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Router listening");

    let server = HttpServer::new(&config, routes);
    server.run(listener, signals::shutdown_signal()).await?;

    tracing::info!("Router stopped");
    Ok(())
}

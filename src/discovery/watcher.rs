//! Handler source watcher for development rebuilds.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::RouterConfig;
use crate::discovery::DiscoveryError;
use crate::handler::HandlerCatalog;
use crate::lifecycle::startup::{build_route_table, StartupError};
use crate::observability::metrics;
use crate::routing::RouteTableHandle;

/// Rebuilds and republishes the route table when handler sources change.
///
/// A failed rebuild is logged and the table currently being served stays
/// in place.
pub struct RouteWatcher {
    path: PathBuf,
    config: RouterConfig,
    catalog: HandlerCatalog,
    routes: Arc<RouteTableHandle>,
}

impl RouteWatcher {
    pub fn new(
        config: RouterConfig,
        catalog: HandlerCatalog,
        routes: Arc<RouteTableHandle>,
    ) -> Result<Self, DiscoveryError> {
        let path = config
            .discovery
            .path
            .clone()
            .ok_or(DiscoveryError::MissingPath(config.discovery.source))?;

        Ok(Self {
            path,
            config,
            catalog,
            routes,
        })
    }

    /// Rediscover handlers and publish a fresh table.
    ///
    /// Returns the number of routes now being served.
    pub fn rebuild(&self) -> Result<usize, StartupError> {
        let result = build_route_table(&self.config, &self.catalog);
        metrics::record_rebuild(result.is_ok());

        let table = self.routes.publish(result?);
        Ok(table.len())
    }

    /// Start watching in a background thread.
    ///
    /// Watching stops when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let mode = if self.path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        tracing::info!(paths = ?event.paths, "Handler sources changed, rebuilding routes");
                        if let Err(e) = self.rebuild() {
                            tracing::error!(
                                error = %e,
                                "Failed to rebuild route table. Keeping current routes."
                            );
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, mode)?;

        tracing::info!(path = ?path, "Route watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiscoveryConfig, DiscoverySource};
    use crate::handler::{ApiRequest, HandlerModule};

    async fn noop(_req: ApiRequest) {}

    fn setup(dir: &std::path::Path) -> (RouteWatcher, Arc<RouteTableHandle>) {
        let catalog = HandlerCatalog::new()
            .register("hello+api.rs", HandlerModule::new().get(noop))
            .register("bye+api.rs", HandlerModule::new().get(noop))
            .register("[slug]+api.rs", HandlerModule::new().get(noop))
            .register("[other]+api.rs", HandlerModule::new().get(noop));

        let config = RouterConfig {
            discovery: DiscoveryConfig {
                source: DiscoverySource::Directory,
                path: Some(dir.to_path_buf()),
                watch: true,
            },
            ..RouterConfig::default()
        };

        std::fs::write(dir.join("hello+api.rs"), "").unwrap();
        let table = build_route_table(&config, &catalog).unwrap();
        let routes = Arc::new(RouteTableHandle::new(table));
        let watcher = RouteWatcher::new(config, catalog, routes.clone()).unwrap();
        (watcher, routes)
    }

    #[test]
    fn test_rebuild_publishes_new_routes() {
        let dir = tempfile::tempdir().unwrap();
        let (watcher, routes) = setup(dir.path());
        assert!(!routes.snapshot().resolve("/bye").is_match());

        std::fs::write(dir.path().join("bye+api.rs"), "").unwrap();
        assert_eq!(watcher.rebuild().unwrap(), 2);
        assert!(routes.snapshot().resolve("/bye").is_match());
    }

    #[test]
    fn test_failed_rebuild_keeps_current_table() {
        let dir = tempfile::tempdir().unwrap();
        let (watcher, routes) = setup(dir.path());

        std::fs::write(dir.path().join("[slug]+api.rs"), "").unwrap();
        std::fs::write(dir.path().join("[other]+api.rs"), "").unwrap();
        let err = watcher.rebuild().unwrap_err();

        assert!(matches!(err, StartupError::Routes(_)));
        assert_eq!(routes.snapshot().len(), 1);
        assert!(routes.snapshot().resolve("/hello").is_match());
    }

    #[test]
    fn test_requires_path() {
        let err = RouteWatcher::new(
            RouterConfig::default(),
            HandlerCatalog::new(),
            Arc::new(RouteTableHandle::new(Default::default())),
        )
        .err()
        .unwrap();
        assert!(matches!(err, DiscoveryError::MissingPath(DiscoverySource::Catalog)));
    }
}

//! Handler discovery subsystem.
//!
//! # Data Flow
//! ```text
//! DiscoveryConfig.source
//!     → catalog:   every module registered in the HandlerCatalog
//!     → manifest:  manifest.rs (TOML list of paths + methods)
//!     → directory: scan.rs (`*+api` sources under a root, via walkdir)
//!     → DiscoveredHandler[] (identifier, declared methods, deadline)
//!
//! Development mode:
//!     watcher.rs detects change under DiscoveryConfig.path
//!     → rediscover → load → build
//!     → RouteTableHandle::publish (atomic swap)
//! ```
//!
//! # Design Decisions
//! - Discovery only produces identifiers; the core never scans the file system
//! - Identifiers are kept as written; normalization happens in the parser

pub mod manifest;
pub mod scan;
pub mod watcher;

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{DiscoveryConfig, DiscoverySource};
use crate::handler::{HandlerCatalog, MethodSet};

pub use watcher::RouteWatcher;

/// One handler reported by a discovery source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredHandler {
    /// Relative source path, e.g. `blog/[post]+api.rs`.
    pub identifier: String,
    /// Methods the source says the handler exports, when known.
    pub methods: Option<MethodSet>,
    /// Per-route handler deadline.
    pub timeout: Option<Duration>,
}

impl DiscoveredHandler {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            methods: None,
            timeout: None,
        }
    }
}

/// Errors raised while discovering handlers.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot scan {root}: {source}")]
    Scan {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid handler manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("discovery source {0:?} needs a path")]
    MissingPath(DiscoverySource),
}

/// Run the configured discovery source.
pub fn discover(
    config: &DiscoveryConfig,
    catalog: &HandlerCatalog,
) -> Result<Vec<DiscoveredHandler>, DiscoveryError> {
    let path = || {
        config
            .path
            .as_deref()
            .ok_or(DiscoveryError::MissingPath(config.source))
    };

    let discovered = match config.source {
        DiscoverySource::Catalog => catalog.discover_all(),
        DiscoverySource::Manifest => manifest::load_manifest(path()?)?,
        DiscoverySource::Directory => scan::scan_directory(path()?)?,
    };

    tracing::debug!(
        source = ?config.source,
        handlers = discovered.len(),
        "Handlers discovered"
    );
    Ok(discovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ApiRequest, HandlerModule};

    async fn noop(_req: ApiRequest) {}

    #[test]
    fn test_catalog_source() {
        let catalog = HandlerCatalog::new().register("hello", HandlerModule::new().get(noop));
        let discovered = discover(&DiscoveryConfig::default(), &catalog).unwrap();
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].identifier, "hello");
    }

    #[test]
    fn test_missing_path() {
        let config = DiscoveryConfig {
            source: DiscoverySource::Directory,
            path: None,
            watch: false,
        };
        let err = discover(&config, &HandlerCatalog::new()).unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingPath(DiscoverySource::Directory)));
    }
}

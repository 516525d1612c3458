//! Atomically swappable route table.
//!
//! # Design Decisions
//! - Single writer (startup, then the development watcher), many readers
//! - Readers take an `Arc` snapshot per request and keep it until the
//!   response is produced, so a rebuild never changes an in-flight request
//! - Publication is one `ArcSwap::store`; there is no partially updated table

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::routing::table::RouteTable;

/// Shared handle to the currently published route table.
pub struct RouteTableHandle {
    current: ArcSwap<RouteTable>,
}

impl RouteTableHandle {
    pub fn new(table: RouteTable) -> Self {
        metrics::record_routes_registered(table.len());
        Self {
            current: ArcSwap::from_pointee(table),
        }
    }

    /// The table to use for one request.
    pub fn snapshot(&self) -> Arc<RouteTable> {
        self.current.load_full()
    }

    /// Replace the published table, returning the previous one.
    pub fn publish(&self, table: RouteTable) -> Arc<RouteTable> {
        let routes = table.len();
        let previous = self.current.swap(Arc::new(table));
        metrics::record_routes_registered(routes);
        tracing::info!(
            routes,
            previous_routes = previous.len(),
            "Route table published"
        );
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutesConfig;
    use crate::handler::{HandlerModule, LoadedHandler};

    fn table(identifiers: &[&str]) -> RouteTable {
        let handlers = identifiers
            .iter()
            .map(|id| LoadedHandler::new(*id, HandlerModule::new()))
            .collect();
        RouteTable::build(handlers, &RoutesConfig::default()).unwrap()
    }

    #[test]
    fn test_snapshot_survives_publish() {
        let handle = RouteTableHandle::new(table(&["hello"]));
        let before = handle.snapshot();

        let previous = handle.publish(table(&["goodbye"]));

        assert!(Arc::ptr_eq(&before, &previous));
        assert!(before.resolve("/hello").is_match());
        assert!(!before.resolve("/goodbye").is_match());

        let after = handle.snapshot();
        assert!(after.resolve("/goodbye").is_match());
        assert!(!after.resolve("/hello").is_match());
    }
}

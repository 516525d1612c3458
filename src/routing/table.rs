//! Compiled route table.
//!
//! # Responsibilities
//! - Compile every loaded handler identifier into a pattern
//! - Order routes by precedence
//! - Reject ambiguous routes and routes inside the reserved namespace
//! - Resolve request paths (via the matcher)
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Built in one pass; any error aborts the build and no table is produced
//! - Entries are `Arc`ed so a match outlives the snapshot it came from

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RoutesConfig;
use crate::handler::{HandlerModule, LoadedHandler, MethodSet};
use crate::routing::matcher::{self, MatchResult};
use crate::routing::pattern::{MalformedPatternError, RoutePattern, Segment};

/// Two handlers whose patterns have the same precedence shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("routes `{first}` and `{second}` are ambiguous: both compile to `{shape}`")]
pub struct AmbiguousRouteError {
    pub first: String,
    pub second: String,
    pub shape: String,
}

/// Errors raised while building a route table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error(transparent)]
    Malformed(#[from] MalformedPatternError),

    #[error(transparent)]
    Ambiguous(#[from] AmbiguousRouteError),

    #[error("route `{identifier}` is inside the reserved namespace `{namespace}`")]
    ReservedNamespace {
        identifier: String,
        namespace: String,
    },
}

/// One compiled route.
#[derive(Debug)]
pub struct RouteEntry {
    pub identifier: String,
    pub pattern: RoutePattern,
    pub module: Arc<HandlerModule>,
    pub timeout: Option<Duration>,
}

impl RouteEntry {
    /// Methods the backing module exports.
    pub fn methods(&self) -> MethodSet {
        self.module.methods()
    }
}

/// Routes in precedence order.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<Arc<RouteEntry>>,
    mount: Vec<String>,
    reserved: Vec<String>,
}

impl RouteTable {
    /// Build a table from the loaded handler set.
    pub fn build(handlers: Vec<LoadedHandler>, config: &RoutesConfig) -> Result<Self, RouteTableError> {
        let mount = path_segments(&config.mount_prefix);
        let reserved = path_segments(&config.reserved_namespace);

        let mut entries = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let pattern = RoutePattern::parse(&handler.identifier)?;

            if in_reserved_namespace(&mount, &pattern, &reserved) {
                return Err(RouteTableError::ReservedNamespace {
                    identifier: handler.identifier,
                    namespace: config.reserved_namespace.clone(),
                });
            }

            if overlaps_reserved(&mount, &pattern, &reserved) {
                tracing::warn!(
                    identifier = %handler.identifier,
                    namespace = %config.reserved_namespace,
                    "Route can match paths inside the reserved namespace; those requests are never routed to it"
                );
            }

            entries.push(RouteEntry {
                identifier: handler.identifier,
                pattern,
                module: handler.module,
                timeout: handler.timeout,
            });
        }

        entries.sort_by(|a, b| {
            a.pattern
                .precedence_cmp(&b.pattern)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });

        if let Some(pair) = entries
            .windows(2)
            .find(|pair| pair[0].pattern.precedence_cmp(&pair[1].pattern) == Ordering::Equal)
        {
            return Err(AmbiguousRouteError {
                first: pair[0].identifier.clone(),
                second: pair[1].identifier.clone(),
                shape: pair[0].pattern.to_string(),
            }
            .into());
        }

        tracing::debug!(routes = entries.len(), "Route table compiled");

        Ok(Self {
            entries: entries.into_iter().map(Arc::new).collect(),
            mount,
            reserved,
        })
    }

    /// Resolve a request path to its route and parameter bindings.
    pub fn resolve(&self, path: &str) -> MatchResult {
        matcher::match_path(self, path)
    }

    /// Entries in the order they are tried.
    pub fn entries(&self) -> &[Arc<RouteEntry>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn mount(&self) -> &[String] {
        &self.mount
    }

    pub(crate) fn reserved(&self) -> &[String] {
        &self.reserved
    }

    /// Full URL path of an entry, including the mount prefix.
    pub fn mounted_path(&self, entry: &RouteEntry) -> String {
        let prefix: String = self.mount.iter().map(|s| format!("/{}", s)).collect();
        match (prefix.is_empty(), entry.pattern.segments().is_empty()) {
            (true, _) => entry.pattern.to_string(),
            (false, true) => prefix,
            (false, false) => format!("{}{}", prefix, entry.pattern),
        }
    }
}

/// Split a configured prefix such as `/api/v1/` into `["api", "v1"]`.
pub(crate) fn path_segments(prefix: &str) -> Vec<String> {
    prefix
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn in_reserved_namespace(mount: &[String], pattern: &RoutePattern, reserved: &[String]) -> bool {
    if reserved.is_empty() {
        return false;
    }

    let literals = pattern.segments().iter().map(|segment| match segment {
        Segment::Literal(value) => Some(value.as_str()),
        Segment::Named(_) | Segment::CatchAll(_) => None,
    });
    let mounted: Vec<Option<&str>> = mount.iter().map(|s| Some(s.as_str())).chain(literals).collect();

    mounted.len() >= reserved.len()
        && reserved
            .iter()
            .zip(&mounted)
            .all(|(expected, actual)| *actual == Some(expected.as_str()))
}

/// Whether a dynamic prefix lets the mounted pattern reach the reserved namespace.
fn overlaps_reserved(mount: &[String], pattern: &RoutePattern, reserved: &[String]) -> bool {
    if reserved.is_empty() {
        return false;
    }

    let mut mounted = mount
        .iter()
        .map(|s| MountedSegment::Literal(s.as_str()))
        .chain(pattern.segments().iter().map(|segment| match segment {
            Segment::Literal(value) => MountedSegment::Literal(value.as_str()),
            Segment::Named(_) => MountedSegment::Any,
            Segment::CatchAll(_) => MountedSegment::Rest,
        }));

    for expected in reserved {
        match mounted.next() {
            None => return false,
            Some(MountedSegment::Literal(value)) if value != expected => return false,
            Some(MountedSegment::Literal(_)) | Some(MountedSegment::Any) => {}
            Some(MountedSegment::Rest) => return true,
        }
    }
    true
}

enum MountedSegment<'a> {
    Literal(&'a str),
    Any,
    Rest,
}

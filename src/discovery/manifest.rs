//! Handler manifest files.
//!
//! ```toml
//! [[handlers]]
//! path = "blog/[post]+api.rs"
//! methods = ["GET", "DELETE"]
//! timeout_ms = 500
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::discovery::{DiscoveredHandler, DiscoveryError};
use crate::handler::MethodSet;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default)]
    handlers: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    path: String,
    #[serde(default)]
    methods: Option<MethodSet>,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

/// Read the handler set from a manifest file.
pub fn load_manifest(path: &Path) -> Result<Vec<DiscoveredHandler>, DiscoveryError> {
    let content = fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&content).map_err(|source| DiscoveryError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_manifest(content: &str) -> Result<Vec<DiscoveredHandler>, toml::de::Error> {
    let manifest: Manifest = toml::from_str(content)?;
    Ok(manifest
        .handlers
        .into_iter()
        .map(|entry| DiscoveredHandler {
            identifier: entry.path,
            methods: entry.methods,
            timeout: entry.timeout_ms.map(Duration::from_millis),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HttpMethod;

    #[test]
    fn test_parse_entries() {
        let handlers = parse_manifest(
            r#"
            [[handlers]]
            path = "hello"
            methods = ["GET"]

            [[handlers]]
            path = "blog/[post]+api.rs"
            timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(handlers.len(), 2);
        assert_eq!(handlers[0].methods, Some(MethodSet::empty().with(HttpMethod::Get)));
        assert_eq!(handlers[1].methods, None);
        assert_eq!(handlers[1].timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let err = parse_manifest("[[handlers]]\npath = \"x\"\nmethods = [\"get\"]").unwrap_err();
        assert!(err.to_string().contains("unsupported HTTP method"));
    }

    #[test]
    fn test_empty_manifest() {
        assert!(parse_manifest("").unwrap().is_empty());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        fs::write(&path, "[[handlers]]\nmethods = []").unwrap();

        let err = load_manifest(&path).unwrap_err();
        assert!(matches!(err, DiscoveryError::Manifest { .. }));
        assert!(err.to_string().contains("routes.toml"));
    }
}

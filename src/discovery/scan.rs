//! Directory scanning for handler source files.
//!
//! A file is a handler source when its stem ends in the `+api` marker and it
//! carries at most one plain extension (`hello+api.rs`, `blog/[post]+api.ts`).
//! Hidden files and editor leftovers (`hello+api.rs~`, `.hello+api.rs.swp`,
//! `hello+api.rs.orig`) are ignored, so handlers can live next to anything.

use std::path::Path;

use walkdir::WalkDir;

use crate::discovery::{DiscoveredHandler, DiscoveryError};
use crate::routing::pattern::HANDLER_MARKER;

/// Walk `root` and report every handler source below it.
///
/// Identifiers are relative to `root`, use `/` separators and are sorted.
pub fn scan_directory(root: &Path) -> Result<Vec<DiscoveredHandler>, DiscoveryError> {
    let mut identifiers = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| DiscoveryError::Scan {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || !is_handler_source(entry.path()) {
            continue;
        }
        if let Some(identifier) = relative_identifier(root, entry.path()) {
            identifiers.push(identifier);
        }
    }

    identifiers.sort();
    Ok(identifiers.into_iter().map(DiscoveredHandler::new).collect())
}

fn is_handler_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let plain_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(true, |ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    stem.ends_with(HANDLER_MARKER) && plain_extension
}

fn relative_identifier(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

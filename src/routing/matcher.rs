//! Route matching logic.
//!
//! # Responsibilities
//! - Split the request path into segments
//! - Refuse paths outside the mount prefix or inside the reserved namespace
//! - Align the remaining segments against each route in precedence order
//!
//! # Design Decisions
//! - Literal matching is case-sensitive
//! - No trailing-slash normalization: `/hello/` is not `/hello`
//! - Segments are percent-decoded after splitting, so `%2F` stays inside
//!   its segment; invalid UTF-8 after decoding never matches
//! - First match wins; the table is already ordered by precedence
//! - No regex to guarantee O(n) matching per route

use std::borrow::Cow;
use std::sync::Arc;

use percent_encoding::percent_decode_str;

use crate::routing::params::{ParamValue, ParameterBindings};
use crate::routing::pattern::{RoutePattern, Segment};
use crate::routing::table::{RouteEntry, RouteTable};

/// A resolved route with the parameters bound for this request.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub entry: Arc<RouteEntry>,
    pub params: ParameterBindings,
}

/// Outcome of resolving a path.
#[derive(Debug, Clone)]
pub enum MatchResult {
    Matched(RouteMatch),
    NoMatch,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    pub fn into_match(self) -> Option<RouteMatch> {
        match self {
            MatchResult::Matched(route_match) => Some(route_match),
            MatchResult::NoMatch => None,
        }
    }
}

/// Resolve `path` against `table`.
pub fn match_path(table: &RouteTable, path: &str) -> MatchResult {
    let Some(segments) = split_path(path) else {
        return MatchResult::NoMatch;
    };

    if !table.reserved().is_empty() && starts_with(&segments, table.reserved()) {
        return MatchResult::NoMatch;
    }
    if !starts_with(&segments, table.mount()) {
        return MatchResult::NoMatch;
    }
    let relative = &segments[table.mount().len()..];

    table
        .entries()
        .iter()
        .find_map(|entry| {
            align(&entry.pattern, relative).map(|params| RouteMatch {
                entry: Arc::clone(entry),
                params,
            })
        })
        .map_or(MatchResult::NoMatch, MatchResult::Matched)
}

/// `/` → `[]`, `/a/b` → `["a", "b"]`, `/a/` → `["a", ""]`, `/caf%C3%A9` → `["café"]`.
fn split_path(path: &str) -> Option<Vec<Cow<'_, str>>> {
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return Some(Vec::new());
    }
    path.split('/')
        .map(|segment| percent_decode_str(segment).decode_utf8().ok())
        .collect()
}

fn starts_with(segments: &[Cow<'_, str>], prefix: &[String]) -> bool {
    segments.len() >= prefix.len() && prefix.iter().zip(segments).all(|(p, s)| p.as_str() == s.as_ref())
}

/// Align request segments with a pattern, binding captures on success.
fn align(pattern: &RoutePattern, segments: &[Cow<'_, str>]) -> Option<ParameterBindings> {
    let mut params = ParameterBindings::new();

    for (position, segment) in pattern.segments().iter().enumerate() {
        match segment {
            Segment::Literal(expected) => {
                if segments.get(position).map(|s| s.as_ref()) != Some(expected.as_str()) {
                    return None;
                }
            }
            Segment::Named(name) => {
                let value = segments.get(position).filter(|s| !s.is_empty())?;
                params.bind(name, ParamValue::Single(value.to_string()));
            }
            Segment::CatchAll(name) => {
                let rest = segments
                    .get(position..)
                    .filter(|rest| !rest.is_empty() && rest.iter().all(|s| !s.is_empty()))?;
                let values = rest.iter().map(|s| s.to_string()).collect();
                params.bind(name, ParamValue::Multiple(values));
                return Some(params);
            }
        }
    }

    (pattern.segments().len() == segments.len()).then_some(params)
}

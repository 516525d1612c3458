//! Route pattern parsing.
//!
//! # Responsibilities
//! - Normalize a handler identifier (file path) into route segments
//! - Classify each segment as literal, named capture or catch-all
//! - Define the precedence order between patterns
//!
//! # Design Decisions
//! - Parsing is pure: same identifier always yields the same pattern
//! - `[name]` is a named capture, `[...name]` a catch-all, anything else literal
//! - A catch-all may only be the final segment
//! - Precedence compares segment by segment: literal < named < catch-all

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// File name marker that identifies a handler source (`hello+api.rs`).
pub const HANDLER_MARKER: &str = "+api";

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Must equal the request segment exactly (case-sensitive).
    Literal(String),
    /// Matches any single non-empty segment.
    Named(String),
    /// Matches one or more trailing segments.
    CatchAll(String),
}

impl Segment {
    /// Lower rank wins when two patterns differ at the same position.
    fn rank(&self) -> u8 {
        match self {
            Segment::Literal(_) => 0,
            Segment::Named(_) => 1,
            Segment::CatchAll(_) => 2,
        }
    }

    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Named(name) | Segment::CatchAll(name) => Some(name),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(value) => f.write_str(value),
            Segment::Named(name) => write!(f, "[{}]", name),
            Segment::CatchAll(name) => write!(f, "[...{}]", name),
        }
    }
}

/// Why an identifier could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    #[error("catch-all `[...{0}]` must be the last segment")]
    CatchAllNotLast(String),

    #[error("empty parameter name in segment `{0}`")]
    EmptyName(String),

    #[error("parameter `{0}` is declared more than once")]
    DuplicateName(String),

    #[error("unbalanced brackets in segment `{0}`")]
    UnbalancedBrackets(String),

    #[error("empty path segment")]
    EmptySegment,
}

/// A handler identifier that does not follow the routing convention.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed route `{identifier}`: {reason}")]
pub struct MalformedPatternError {
    pub identifier: String,
    pub reason: MalformedReason,
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a handler identifier into a pattern.
    ///
    /// The identifier is normalized first (see [`normalize_identifier`]), so
    /// `blog/[post]+api.rs`, `/blog/[post]` and `(site)/blog/[post]` all
    /// produce the pattern `/blog/[post]`.
    pub fn parse(identifier: &str) -> Result<Self, MalformedPatternError> {
        let malformed = |reason| MalformedPatternError {
            identifier: identifier.to_string(),
            reason,
        };

        let normalized = normalize_identifier(identifier);
        if normalized.is_empty() {
            return Ok(Self { segments: Vec::new() });
        }

        let raw: Vec<&str> = normalized.split('/').collect();
        let mut segments = Vec::with_capacity(raw.len());
        let mut names = HashSet::new();

        for (position, raw_segment) in raw.iter().enumerate() {
            let segment = classify_segment(raw_segment).map_err(malformed)?;

            if let Segment::CatchAll(name) = &segment {
                if position + 1 != raw.len() {
                    return Err(malformed(MalformedReason::CatchAllNotLast(name.clone())));
                }
            }
            if let Some(name) = segment.param_name() {
                if !names.insert(name.to_string()) {
                    return Err(malformed(MalformedReason::DuplicateName(name.to_string())));
                }
            }

            segments.push(segment);
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Precedence order: `Less` means `self` is tried before `other`.
    ///
    /// At the first position where the segment kinds differ, literal beats
    /// named and named beats catch-all. Distinct literals are disjoint and
    /// ordered lexically only to keep the order total. `Equal` means both
    /// patterns have the same shape and would match exactly the same paths.
    pub fn precedence_cmp(&self, other: &RoutePattern) -> Ordering {
        for (a, b) in self.segments.iter().zip(&other.segments) {
            let ordering = a.rank().cmp(&b.rank()).then_with(|| match (a, b) {
                (Segment::Literal(x), Segment::Literal(y)) => x.cmp(y),
                _ => Ordering::Equal,
            });
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        self.segments.len().cmp(&other.segments.len())
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Normalize a handler identifier into a `/`-separated route path without
/// leading or trailing slashes.
///
/// - backslashes become `/`
/// - the final segment loses its `+api` marker and everything after it
/// - a final `index` segment maps to its parent
/// - route groups such as `(admin)` are dropped
pub fn normalize_identifier(identifier: &str) -> String {
    let unified = identifier.replace('\\', "/");
    let trimmed = unified.trim_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }

    let mut segments: Vec<&str> = trimmed.split('/').collect();

    if let Some(last) = segments.last_mut() {
        if let Some(position) = last.find(HANDLER_MARKER) {
            *last = &last[..position];
        }
    }
    if matches!(segments.last(), Some(&"") | Some(&"index")) {
        segments.pop();
    }

    segments
        .into_iter()
        .filter(|s| !is_route_group(s))
        .collect::<Vec<_>>()
        .join("/")
}

fn is_route_group(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('(') && segment.ends_with(')')
}

fn classify_segment(segment: &str) -> Result<Segment, MalformedReason> {
    if segment.is_empty() {
        return Err(MalformedReason::EmptySegment);
    }

    match segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) => {
            if inner.contains(['[', ']']) {
                return Err(MalformedReason::UnbalancedBrackets(segment.to_string()));
            }
            match inner.strip_prefix("...") {
                Some("") => Err(MalformedReason::EmptyName(segment.to_string())),
                Some(name) => Ok(Segment::CatchAll(name.to_string())),
                None if inner.is_empty() => Err(MalformedReason::EmptyName(segment.to_string())),
                None => Ok(Segment::Named(inner.to_string())),
            }
        }
        None if segment.contains(['[', ']']) => {
            Err(MalformedReason::UnbalancedBrackets(segment.to_string()))
        }
        None => Ok(Segment::Literal(segment.to_string())),
    }
}

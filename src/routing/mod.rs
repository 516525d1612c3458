//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup, and on rebuild in development):
//!     LoadedHandler[] (identifier + module)
//!     → pattern.rs (identifier → RoutePattern)
//!     → table.rs (sort by precedence, reject ambiguity / reserved paths)
//!     → handle.rs (publish as immutable snapshot)
//!
//! Incoming Request (path)
//!     → handle.rs (load snapshot)
//!     → matcher.rs (strip mount prefix, align segments)
//!     → Return: RouteMatch (entry + ParameterBindings) or NoMatch
//! ```
//!
//! # Design Decisions
//! - Routes compiled up front, immutable at runtime
//! - Precedence: literal > named > catch-all, decided left to right
//! - Deterministic: same input always matches same route
//! - First match wins (table ordered by precedence)

pub mod handle;
pub mod matcher;
pub mod params;
pub mod pattern;
pub mod table;

pub use handle::RouteTableHandle;
pub use matcher::{match_path, MatchResult, RouteMatch};
pub use params::{ParamValue, ParameterBindings};
pub use pattern::{MalformedPatternError, MalformedReason, RoutePattern, Segment};
pub use table::{AmbiguousRouteError, RouteEntry, RouteTable, RouteTableError};

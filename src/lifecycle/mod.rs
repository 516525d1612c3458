//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Discover handlers → Load modules → Build route table
//!     → Publish snapshot → (watch sources) → Bind listener
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → graceful shutdown of the HTTP server
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routes, then listeners
//! - Any build error before the listener is bound aborts startup
//! - In-flight requests finish against the snapshot they resolved with

pub mod signals;
pub mod startup;

pub use startup::{build_route_table, run, StartupError};

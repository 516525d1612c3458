//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Handler invocation:
//!     → timeouts.rs (route deadline, else dispatch default)
//!     → elapsed: handler future dropped, 504
//! ```
//!
//! # Design Decisions
//! - A deadline of 0 in config means handlers may run indefinitely
//! - Handler panics are isolated by the dispatcher, not here

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineElapsed};

//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap handler invocations with a deadline
//! - Cancel the handler cleanly when it elapses
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from handler errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

/// The deadline passed before the future completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline of {0:?} elapsed")]
pub struct DeadlineElapsed(pub Duration);

/// Pick the deadline for one invocation: the route's own, else the default.
pub fn effective_deadline(route: Option<Duration>, default: Option<Duration>) -> Option<Duration> {
    route.or(default)
}

/// Run `future` to completion, or drop it once `deadline` passes.
pub async fn with_deadline<F>(deadline: Option<Duration>, future: F) -> Result<F::Output, DeadlineElapsed>
where
    F: Future,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| DeadlineElapsed(limit)),
        None => Ok(future.await),
    }
}

//! What happened to a dispatched request.

use std::fmt;

use axum::http::StatusCode;

use crate::handler::MethodSet;

/// Result of one dispatch, used for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No route matched the path.
    NotFound,
    /// The route exists but does not export the method.
    MethodNotAllowed { allowed: MethodSet },
    /// The request could not be turned into a handler request.
    BadRequest,
    /// The handler finished; `status` is what it answered with.
    Completed { status: StatusCode },
    /// The handler returned an error or panicked.
    Failed,
    /// The handler ran past its deadline.
    TimedOut,
}

impl DispatchOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchOutcome::NotFound => StatusCode::NOT_FOUND,
            DispatchOutcome::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            DispatchOutcome::BadRequest => StatusCode::BAD_REQUEST,
            DispatchOutcome::Completed { status } => *status,
            DispatchOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchOutcome::TimedOut => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::NotFound => "not_found",
            DispatchOutcome::MethodNotAllowed { .. } => "method_not_allowed",
            DispatchOutcome::BadRequest => "bad_request",
            DispatchOutcome::Completed { .. } => "completed",
            DispatchOutcome::Failed => "failed",
            DispatchOutcome::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(DispatchOutcome::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            DispatchOutcome::MethodNotAllowed { allowed: MethodSet::empty() }.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            DispatchOutcome::Completed { status: StatusCode::CREATED }.status(),
            StatusCode::CREATED
        );
        assert_eq!(DispatchOutcome::Failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(DispatchOutcome::TimedOut.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}

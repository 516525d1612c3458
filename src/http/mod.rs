//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all fallback)
//!     → request.rs (request ID, absolute URL)
//!     → routing (resolve path against the current snapshot)
//!     → dispatch (invoke handler)
//!     → response.rs (404 / 405 / 500 / 504 bodies)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};

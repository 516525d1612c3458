//! File-convention API routes.
//!
//! Handler modules are named by their source path (`blog/[post]+api.rs`),
//! compiled into a precedence-ordered route table and served over HTTP with
//! 404 / 405 / 500 fallbacks.

pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::schema::RouterConfig;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use handler::{ApiRequest, ApiResponse, HandlerCatalog, HandlerError, HandlerModule};
pub use http::HttpServer;
pub use routing::{MatchResult, RouteTable, RouteTableHandle};

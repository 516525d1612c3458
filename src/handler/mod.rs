//! Handler subsystem.
//!
//! # Data Flow
//! ```text
//! Application code
//!     → module.rs (HandlerModule: one optional function per HttpMethod)
//!     → catalog.rs (identifier → HandlerModule registry)
//!
//! Startup:
//!     DiscoveredHandler[] + HandlerCatalog
//!     → catalog.load() (unknown identifiers / missing exports are fatal)
//!     → LoadedHandler[] handed to the route table
//!
//! Per request:
//!     request.rs (ApiRequest: url, headers, params, lazy body)
//!     → handler function
//!     → response.rs (ApiResponse: status, headers, body)
//! ```

pub mod catalog;
pub mod method;
pub mod module;
pub mod request;
pub mod response;

pub use catalog::{CatalogError, HandlerCatalog, LoadedHandler};
pub use method::{HttpMethod, MethodSet, UnsupportedMethod};
pub use module::{HandlerError, HandlerFn, HandlerModule, HandlerResult, IntoHandlerResult};
pub use request::{ApiRequest, BodyError};
pub use response::{ApiResponse, ResponseBody};

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → handed to startup, server and dispatcher
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the route table is rebuilt live
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    DiscoveryConfig, DiscoverySource, DispatchConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, RouterConfig, RoutesConfig,
};
pub use validation::ValidationError;

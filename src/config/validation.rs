//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (addresses parse, body limit > 0)
//! - Check the mount prefix does not live inside the reserved namespace
//! - Check discovery sources that need a path have one
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{DiscoverySource, RouterConfig};
use crate::routing::table::path_segments;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("`{field}` is not a valid socket address: `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("`listener.max_body_size` must be greater than zero")]
    ZeroBodyLimit,

    #[error("`{field}` must start with `/`: `{value}`")]
    RelativePrefix { field: &'static str, value: String },

    #[error("mount prefix `{mount}` is inside the reserved namespace `{reserved}`")]
    MountInsideReserved { mount: String, reserved: String },

    #[error("discovery source `{0:?}` requires `discovery.path`")]
    MissingDiscoveryPath(DiscoverySource),

    #[error("`discovery.watch` needs a manifest or directory source")]
    WatchWithoutPath,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let routes = &config.routes;
    for (field, value) in [
        ("routes.mount_prefix", &routes.mount_prefix),
        ("routes.reserved_namespace", &routes.reserved_namespace),
    ] {
        if !value.is_empty() && !value.starts_with('/') {
            errors.push(ValidationError::RelativePrefix {
                field,
                value: value.clone(),
            });
        }
    }

    let mount = path_segments(&routes.mount_prefix);
    let reserved = path_segments(&routes.reserved_namespace);
    if !reserved.is_empty() && mount.starts_with(&reserved) {
        errors.push(ValidationError::MountInsideReserved {
            mount: routes.mount_prefix.clone(),
            reserved: routes.reserved_namespace.clone(),
        });
    }

    let discovery = &config.discovery;
    match discovery.source {
        DiscoverySource::Manifest | DiscoverySource::Directory if discovery.path.is_none() => {
            errors.push(ValidationError::MissingDiscoveryPath(discovery.source));
        }
        DiscoverySource::Catalog if discovery.watch => {
            errors.push(ValidationError::WatchWithoutPath);
        }
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RouterConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = RouterConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.listener.max_body_size = 0;
        config.routes.mount_prefix = "api".into();
        config.discovery.source = DiscoverySource::Manifest;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroBodyLimit));
        assert!(errors.contains(&ValidationError::MissingDiscoveryPath(DiscoverySource::Manifest)));
    }

    #[test]
    fn test_mount_inside_reserved() {
        let mut config = RouterConfig::default();
        config.routes.mount_prefix = "/_api-routes/v1".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::MountInsideReserved { .. }));
    }

    #[test]
    fn test_watch_requires_a_path_source() {
        let mut config = RouterConfig::default();
        config.discovery.watch = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::WatchWithoutPath])
        );
    }
}

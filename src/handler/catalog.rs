//! Registry of compiled-in handler modules.
//!
//! # Responsibilities
//! - Map handler identifiers to their [`HandlerModule`]
//! - Load the modules named by the discovered handler set
//! - Check that declared methods are really exported
//!
//! # Design Decisions
//! - Keys are normalized with the same rules the pattern parser uses, so
//!   `blog/[post]+api.rs` and `blog/[post]` name the same module
//! - Sources that normalize to the same key (`(shop)/cart+api.rs` and
//!   `(admin)/cart+api.rs`) are all kept and all discovered, so the route
//!   table rejects them as ambiguous instead of one silently replacing the other
//! - Loading fails as a whole; a partially loaded handler set is never used

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::discovery::DiscoveredHandler;
use crate::handler::method::MethodSet;
use crate::handler::module::HandlerModule;
use crate::routing::pattern::normalize_identifier;

/// Errors raised while loading handler modules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("no handler module is registered for `{0}`")]
    UnknownHandler(String),

    #[error("`{identifier}` could name any of {candidates:?}")]
    Conflicting {
        identifier: String,
        candidates: Vec<String>,
    },

    #[error("handler `{identifier}` declares {missing} but does not export it")]
    MissingExports {
        identifier: String,
        missing: MethodSet,
    },
}

/// A handler module ready to be placed in the route table.
#[derive(Debug, Clone)]
pub struct LoadedHandler {
    pub identifier: String,
    pub module: Arc<HandlerModule>,
    /// Per-route handler deadline, overriding the dispatcher default.
    pub timeout: Option<Duration>,
}

impl LoadedHandler {
    pub fn new(identifier: impl Into<String>, module: HandlerModule) -> Self {
        Self {
            identifier: identifier.into(),
            module: Arc::new(module),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// All handler modules linked into the application.
#[derive(Debug, Clone, Default)]
pub struct HandlerCatalog {
    /// Normalized key to every `(identifier as registered, module)` under it.
    modules: BTreeMap<String, Vec<(String, Arc<HandlerModule>)>>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module` under `identifier`.
    ///
    /// Registering the same identifier again replaces the earlier module.
    pub fn register(mut self, identifier: &str, module: HandlerModule) -> Self {
        let sources = self.modules.entry(normalize_identifier(identifier)).or_default();
        sources.retain(|(registered, _)| registered != identifier);
        sources.push((identifier.to_string(), Arc::new(module)));
        self
    }

    pub fn len(&self) -> usize {
        self.modules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Every registered module, with its exports as the declared methods.
    pub fn discover_all(&self) -> Vec<DiscoveredHandler> {
        self.modules
            .values()
            .flatten()
            .map(|(identifier, module)| DiscoveredHandler {
                identifier: identifier.clone(),
                methods: Some(module.methods()),
                timeout: None,
            })
            .collect()
    }

    /// Find the module for `identifier`.
    ///
    /// An exact match wins when several sources share a normalized key.
    fn lookup(&self, identifier: &str) -> Result<&Arc<HandlerModule>, CatalogError> {
        let sources = self
            .modules
            .get(&normalize_identifier(identifier))
            .ok_or_else(|| CatalogError::UnknownHandler(identifier.to_string()))?;

        if let [(_, module)] = sources.as_slice() {
            return Ok(module);
        }
        sources
            .iter()
            .find(|(registered, _)| registered == identifier)
            .map(|(_, module)| module)
            .ok_or_else(|| CatalogError::Conflicting {
                identifier: identifier.to_string(),
                candidates: sources.iter().map(|(registered, _)| registered.clone()).collect(),
            })
    }

    /// Load the modules backing a discovered handler set.
    pub fn load(&self, discovered: &[DiscoveredHandler]) -> Result<Vec<LoadedHandler>, CatalogError> {
        discovered
            .iter()
            .map(|handler| {
                let module = self.lookup(&handler.identifier)?;

                if let Some(declared) = handler.methods {
                    let missing = declared.difference(&module.methods());
                    if !missing.is_empty() {
                        return Err(CatalogError::MissingExports {
                            identifier: handler.identifier.clone(),
                            missing,
                        });
                    }
                }

                Ok(LoadedHandler {
                    identifier: handler.identifier.clone(),
                    module: Arc::clone(module),
                    timeout: handler.timeout,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::method::HttpMethod;
    use crate::handler::request::ApiRequest;

    async fn noop(_req: ApiRequest) {}

    fn catalog() -> HandlerCatalog {
        HandlerCatalog::new()
            .register("hello", HandlerModule::new().get(noop))
            .register("blog/[post]+api.rs", HandlerModule::new().get(noop).post(noop))
    }

    fn discovered(identifier: &str, methods: Option<MethodSet>) -> DiscoveredHandler {
        DiscoveredHandler {
            identifier: identifier.to_string(),
            methods,
            timeout: None,
        }
    }

    #[test]
    fn test_identifiers_are_normalized() {
        let catalog = catalog();
        assert!(catalog.lookup("blog/[post]").is_ok());
        assert!(catalog.lookup("/hello+api.ts").is_ok());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_colliding_sources_are_all_kept() {
        let catalog = HandlerCatalog::new()
            .register("(shop)/cart+api.rs", HandlerModule::new().get(noop))
            .register("(admin)/cart+api.rs", HandlerModule::new().post(noop))
            .register("(admin)/cart+api.rs", HandlerModule::new().post(noop));
        assert_eq!(catalog.len(), 2);

        let loaded = catalog.load(&catalog.discover_all()).unwrap();
        let identifiers: Vec<_> = loaded.iter().map(|h| h.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["(shop)/cart+api.rs", "(admin)/cart+api.rs"]);
        assert!(loaded[0].module.methods().contains(HttpMethod::Get));
        assert!(loaded[1].module.methods().contains(HttpMethod::Post));
    }

    #[test]
    fn test_colliding_sources_need_an_exact_identifier() {
        let catalog = HandlerCatalog::new()
            .register("(shop)/cart+api.rs", HandlerModule::new().get(noop))
            .register("(admin)/cart+api.rs", HandlerModule::new().post(noop));

        let err = catalog.load(&[discovered("cart", None)]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::Conflicting {
                identifier: "cart".into(),
                candidates: vec!["(shop)/cart+api.rs".into(), "(admin)/cart+api.rs".into()],
            }
        );
    }

    #[test]
    fn test_load_unknown_handler() {
        let err = catalog().load(&[discovered("missing", None)]).unwrap_err();
        assert_eq!(err, CatalogError::UnknownHandler("missing".into()));
    }

    #[test]
    fn test_load_checks_declared_methods() {
        let declared = MethodSet::empty().with(HttpMethod::Get).with(HttpMethod::Put);
        let err = catalog().load(&[discovered("hello", Some(declared))]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::MissingExports {
                identifier: "hello".into(),
                missing: MethodSet::empty().with(HttpMethod::Put),
            }
        );
    }

    #[test]
    fn test_discover_all_round_trips() {
        let catalog = catalog();
        let loaded = catalog.load(&catalog.discover_all()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().any(|h| h.identifier == "blog/[post]+api.rs"));
    }
}

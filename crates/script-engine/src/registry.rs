//! Engine registry
//!
//! Resolves a human-readable engine name to a factory. The process-wide
//! set is collected at link time via `inventory` and built lazily once;
//! after that it is read-only, so concurrent lookups need no locks.
//!
//! Lookup never fails hard: an unknown name returns `None` so callers can
//! report a configuration-level error instead of crashing.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::engine::EngineFactory;

/// Link-time registration of an engine factory.
///
/// Backends submit a constructor function:
///
/// ```ignore
/// fn factory() -> Arc<dyn EngineFactory> {
///     Arc::new(MyEngineFactory)
/// }
/// inventory::submit!(EngineRegistration(factory));
/// ```
pub struct EngineRegistration(pub fn() -> Arc<dyn EngineFactory>);

inventory::collect!(EngineRegistration);

static GLOBAL: Lazy<EngineRegistry> = Lazy::new(EngineRegistry::from_inventory);

/// Registry of available engine factories, keyed by display name.
pub struct EngineRegistry {
    factories: Vec<Arc<dyn EngineFactory>>,
}

impl EngineRegistry {
    /// Build a registry from an explicit factory list.
    pub fn with_factories(factories: Vec<Arc<dyn EngineFactory>>) -> Self {
        Self { factories }
    }

    /// Build a registry from every link-time registered factory.
    pub fn from_inventory() -> Self {
        let factories: Vec<Arc<dyn EngineFactory>> = inventory::iter::<EngineRegistration>
            .into_iter()
            .map(|registration| (registration.0)())
            .collect();
        log::debug!(
            "engine registry initialized with {} factories: {:?}",
            factories.len(),
            factories
                .iter()
                .map(|f| f.engine_name().to_string())
                .collect::<Vec<_>>()
        );
        Self { factories }
    }

    /// The process-wide registry, built once on first use.
    pub fn global() -> &'static EngineRegistry {
        &GLOBAL
    }

    /// Resolve an engine display name to its factory.
    ///
    /// Matching is exact and case-sensitive. Returns `None` for unknown
    /// names and for factories that expose zero invocation aliases.
    pub fn factory(&self, engine_name: &str) -> Option<Arc<dyn EngineFactory>> {
        self.factories
            .iter()
            .find(|f| f.engine_name() == engine_name)
            .filter(|f| !f.aliases().is_empty())
            .cloned()
    }

    /// Whether an engine display name resolves at all.
    ///
    /// The diagnostic query: same matching rules as [`factory`](Self::factory)
    /// without handing out anything runnable.
    pub fn is_resolvable(&self, engine_name: &str) -> bool {
        self.factory(engine_name).is_some()
    }

    /// Display names of every resolvable engine.
    pub fn engine_names(&self) -> Vec<&str> {
        self.factories
            .iter()
            .filter(|f| !f.aliases().is_empty())
            .map(|f| f.engine_name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScriptEngine;

    struct NamedFactory {
        name: &'static str,
        aliases: &'static [&'static str],
    }

    impl EngineFactory for NamedFactory {
        fn engine_name(&self) -> &str {
            self.name
        }

        fn aliases(&self) -> &[&str] {
            self.aliases
        }

        fn create_engine(&self) -> Box<dyn ScriptEngine> {
            unreachable!("tests never mint engines from NamedFactory")
        }
    }

    fn registry() -> EngineRegistry {
        EngineRegistry::with_factories(vec![
            Arc::new(NamedFactory {
                name: "Rhai",
                aliases: &["rhai"],
            }),
            Arc::new(NamedFactory {
                name: "Hollow",
                aliases: &[],
            }),
        ])
    }

    #[test]
    fn test_resolve_by_display_name() {
        assert!(registry().factory("Rhai").is_some());
        assert!(registry().is_resolvable("Rhai"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(registry().factory("rhai").is_none());
        assert!(!registry().is_resolvable("RHAI"));
    }

    #[test]
    fn test_unknown_name_is_none_not_error() {
        assert!(registry().factory("nope").is_none());
    }

    #[test]
    fn test_factory_without_aliases_is_not_resolvable() {
        let registry = registry();
        assert!(registry.factory("Hollow").is_none());
        assert!(!registry.is_resolvable("Hollow"));
        assert_eq!(registry.engine_names(), vec!["Rhai"]);
    }

    #[test]
    fn test_global_registry_contains_builtins() {
        let global = EngineRegistry::global();
        assert!(global.is_resolvable("Rhai"));
        assert!(global.is_resolvable("Lua"));
        assert!(!global.is_resolvable("Fortran"));
    }
}

//! The kernel registry: kind names to factories.
//!
//! A closed (but extensible) table populated at startup stands in for any
//! kind of dynamic instantiation: hosts register factories for the kernels
//! they ship and graph definitions refer to them by name.

use hashbrown::HashMap;

use crate::error::ConfigError;
use crate::kernel::Kernel;
use crate::kernels;
use crate::schema::KernelSignature;

pub type KernelFactory = fn() -> Box<dyn Kernel>;

pub struct KernelRegistry {
    factories: HashMap<&'static str, KernelFactory>,
}

impl KernelRegistry {
    pub fn empty() -> KernelRegistry {
        KernelRegistry {
            factories: HashMap::new(),
        }
    }

    /// A registry seeded with the bundled kernels.
    pub fn with_builtins() -> KernelRegistry {
        let mut registry = KernelRegistry::empty();
        for factory in kernels::builtins() {
            registry.register(factory);
        }
        registry
    }

    /// Register a factory under the name its signature declares. The
    /// latest registration for a name wins.
    pub fn register(&mut self, factory: KernelFactory) {
        let name = factory().signature().name;
        self.factories.insert(name, factory);
    }

    pub fn create(&self, kind: &str) -> Result<Box<dyn Kernel>, ConfigError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| ConfigError::UnknownKernel {
                kind: kind.to_string(),
            })?;
        Ok(factory())
    }

    /// The catalogue of registered kernels, sorted by name.
    pub fn signatures(&self) -> Vec<&'static KernelSignature> {
        let mut signatures: Vec<_> = self
            .factories
            .values()
            .map(|factory| factory().signature())
            .collect();
        signatures.sort_by_key(|s| s.name);
        signatures
    }

    /// Serialisable description of the catalogue, for host UIs.
    pub fn describe(&self) -> serde_json::Value {
        serde_json::to_value(self.signatures()).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        KernelRegistry::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = KernelRegistry::with_builtins();
        for kind in ["add", "maximum", "minimum", "add_scalar", "in_range", "temporal_mean"] {
            assert!(registry.create(kind).is_ok(), "missing builtin {kind}");
        }
        assert!(matches!(
            registry.create("nope"),
            Err(ConfigError::UnknownKernel { .. })
        ));
    }

    #[test]
    fn catalogue_is_exportable() {
        let registry = KernelRegistry::with_builtins();
        let json = registry.describe();
        let names: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"temporal_mean"));
        // Sorted by name.
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}

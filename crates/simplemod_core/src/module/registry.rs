//! In-process module registry, the loader-facing side of manifests.

use crate::module::manifest::{ManifestValidationError, ModuleManifest};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Registered module snapshot held by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredModule {
    pub manifest: ModuleManifest,
}

/// Registry of installable modules keyed by manifest name.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    entries: BTreeMap<String, RegisteredModule>,
    dependency_index: BTreeMap<String, BTreeSet<String>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one module after manifest validation.
    ///
    /// # Contract
    /// - The manifest must pass `validate()`.
    /// - Non-installable manifests are rejected.
    /// - Module names are unique within a registry.
    pub fn register(&mut self, manifest: ModuleManifest) -> Result<(), ModuleRegistryError> {
        manifest
            .validate()
            .map_err(ModuleRegistryError::InvalidManifest)?;
        if !manifest.installable {
            return Err(ModuleRegistryError::NotInstallable(manifest.name));
        }
        if self.entries.contains_key(manifest.name.as_str()) {
            return Err(ModuleRegistryError::DuplicateModule(manifest.name));
        }

        for dependency in &manifest.depends {
            self.dependency_index
                .entry(dependency.trim().to_string())
                .or_default()
                .insert(manifest.name.clone());
        }

        self.entries
            .insert(manifest.name.clone(), RegisteredModule { manifest });
        Ok(())
    }

    /// Registers the baseline simple record module.
    pub fn register_simple_module(&mut self) -> Result<(), ModuleRegistryError> {
        self.register(ModuleManifest::simple_module())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, module_name: &str) -> Option<&RegisteredModule> {
        self.entries.get(module_name)
    }

    /// Lists registered modules declaring a dependency on `dependency`.
    pub fn list_by_dependency(&self, dependency: &str) -> Vec<&RegisteredModule> {
        let Some(names) = self.dependency_index.get(dependency) else {
            return vec![];
        };
        names
            .iter()
            .filter_map(|name| self.entries.get(name))
            .collect()
    }
}

/// Module registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRegistryError {
    InvalidManifest(ManifestValidationError),
    DuplicateModule(String),
    NotInstallable(String),
}

impl Display for ModuleRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidManifest(err) => write!(f, "invalid module manifest: {err}"),
            Self::DuplicateModule(name) => write!(f, "module already registered: {name}"),
            Self::NotInstallable(name) => {
                write!(f, "module is marked not installable: {name}")
            }
        }
    }
}

impl Error for ModuleRegistryError {}

#[cfg(test)]
mod tests {
    use super::{ModuleRegistry, ModuleRegistryError};
    use crate::module::manifest::ModuleManifest;

    #[test]
    fn registers_baseline_module() {
        let mut registry = ModuleRegistry::new();
        registry
            .register_simple_module()
            .expect("baseline registration");

        assert_eq!(registry.len(), 1);
        let entry = registry.get("Simple Module").expect("registered module");
        assert_eq!(entry.manifest.version, "18.0.1.0.0");
    }

    #[test]
    fn rejects_duplicate_module_name() {
        let mut registry = ModuleRegistry::new();
        registry
            .register_simple_module()
            .expect("first registration should succeed");
        let err = registry
            .register_simple_module()
            .expect_err("duplicate registration must fail");
        assert!(matches!(err, ModuleRegistryError::DuplicateModule(_)));
    }

    #[test]
    fn rejects_non_installable_manifest() {
        let mut registry = ModuleRegistry::new();
        let mut manifest = ModuleManifest::simple_module();
        manifest.installable = false;
        let err = registry
            .register(manifest)
            .expect_err("non-installable manifest must fail");
        assert!(matches!(err, ModuleRegistryError::NotInstallable(_)));
    }

    #[test]
    fn builds_dependency_index() {
        let mut registry = ModuleRegistry::new();
        registry
            .register_simple_module()
            .expect("baseline registration");

        let dependents = registry.list_by_dependency("base");
        assert_eq!(dependents.len(), 1);
        assert_eq!(dependents[0].manifest.name, "Simple Module");
        assert!(registry.list_by_dependency("web").is_empty());
    }
}

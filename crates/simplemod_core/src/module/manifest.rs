//! Module manifest declaration and validation.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Dotted numeric version with three to five components, matching the
/// `major.minor.patch` and framework-prefixed `serie.major.minor.patch`
/// conventions (`18.0.1.0.0`).
static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+){2,4}$").expect("version pattern must compile"));

/// Declarative metadata for one installable module.
///
/// Mirrors the manifest keys a module loader consumes: identity, ordering
/// constraints (`depends`) and data files to install (`data`). The listed
/// data files are metadata only; this crate does not render views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleManifest {
    /// Human-readable module name; also the registry key.
    pub name: String,
    /// Dotted numeric version string.
    pub version: String,
    /// One-line module summary.
    pub summary: String,
    /// Module author or maintaining organization.
    pub author: String,
    /// SPDX-ish license label.
    pub license: String,
    /// Free-form category label.
    pub category: String,
    /// Names of modules that must be installed first.
    pub depends: Vec<String>,
    /// Data files installed with the module (views, access CSV).
    pub data: Vec<String>,
    /// Whether the loader may install this module at all.
    pub installable: bool,
    /// Whether the module is a standalone application.
    pub application: bool,
    /// Whether the module installs automatically once its dependencies do.
    pub auto_install: bool,
}

impl ModuleManifest {
    /// Baseline manifest for the simple record module itself.
    pub fn simple_module() -> Self {
        Self {
            name: "Simple Module".to_string(),
            version: "18.0.1.0.0".to_string(),
            summary: "A simple record module for demonstration".to_string(),
            author: "Simple Module Maintainers".to_string(),
            license: "LGPL-3".to_string(),
            category: "Uncategorized".to_string(),
            depends: vec!["base".to_string()],
            data: vec![
                "views/simple_model_views.xml".to_string(),
                "security/record_access.csv".to_string(),
            ],
            installable: true,
            application: false,
            auto_install: false,
        }
    }

    /// Validates declaration-level manifest invariants.
    pub fn validate(&self) -> Result<(), ManifestValidationError> {
        if self.name.trim().is_empty() {
            return Err(ManifestValidationError::EmptyName);
        }

        let version = self.version.trim();
        if version.is_empty() {
            return Err(ManifestValidationError::EmptyVersion);
        }
        if !VERSION_PATTERN.is_match(version) {
            return Err(ManifestValidationError::InvalidVersion(
                self.version.clone(),
            ));
        }

        let mut dedup = BTreeSet::<&str>::new();
        for dependency in &self.depends {
            let normalized = dependency.trim();
            if normalized.is_empty() {
                return Err(ManifestValidationError::EmptyDependency);
            }
            if !dedup.insert(normalized) {
                return Err(ManifestValidationError::DuplicateDependency(
                    normalized.to_string(),
                ));
            }
        }

        for path in &self.data {
            if path.trim().is_empty() {
                return Err(ManifestValidationError::EmptyDataPath);
            }
        }

        Ok(())
    }
}

/// Internal manifest validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestValidationError {
    EmptyName,
    EmptyVersion,
    InvalidVersion(String),
    EmptyDependency,
    DuplicateDependency(String),
    EmptyDataPath,
}

impl Display for ManifestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "manifest name must not be empty"),
            Self::EmptyVersion => write!(f, "manifest version must not be empty"),
            Self::InvalidVersion(value) => write!(
                f,
                "manifest version is invalid: {value} (expected dotted numeric components)"
            ),
            Self::EmptyDependency => write!(f, "manifest contains empty dependency entry"),
            Self::DuplicateDependency(value) => {
                write!(f, "manifest dependency is duplicated: {value}")
            }
            Self::EmptyDataPath => write!(f, "manifest contains empty data file path"),
        }
    }
}

impl Error for ManifestValidationError {}

//! Module manifest contracts and loader registry.
//!
//! This module defines declaration-time metadata for installable modules
//! and the in-process registry that validates and indexes them. Runtime
//! code loading and view rendering are out of scope.

pub mod manifest;
pub mod registry;

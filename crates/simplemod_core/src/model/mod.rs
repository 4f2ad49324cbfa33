//! Canonical domain model for the simple record module.
//!
//! # Responsibility
//! - Define the single `Record` entity and its field-level validation.
//! - Keep one canonical schema for everything the storage layer persists.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Visibility is represented by the `active` flag, never hard delete.

pub mod record;

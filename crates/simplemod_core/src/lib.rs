//! Core logic for the simple record module.
//! This crate is the single source of truth for record invariants,
//! access rules and module metadata.

pub mod db;
pub mod logging;
pub mod model;
pub mod module;
pub mod repo;
pub mod security;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{
    FieldValue, Record, RecordId, RecordValidationError, RECORD_MODEL,
};
pub use module::manifest::{ManifestValidationError, ModuleManifest};
pub use module::registry::{ModuleRegistry, ModuleRegistryError, RegisteredModule};
pub use repo::access_repo::{AccessRepoError, SqliteAccessRepository};
pub use repo::record_repo::{
    RecordListQuery, RecordRepository, RepoError, RepoResult, SqliteRecordRepository,
};
pub use security::access::{
    parse_access_csv, AccessCsvError, AccessError, AccessGuard, AccessOperation, AccessRule,
    RECORD_ACCESS_CSV,
};
pub use service::record_service::{RecordService, ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Record use-case service with access enforcement.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for core callers.
//! - Assert the acting group's permission before every operation.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - No operation reaches the repository when the access check fails.
//! - Service APIs never bypass repository validation contracts.

use crate::model::record::{FieldValue, Record, RecordId, RECORD_MODEL};
use crate::repo::record_repo::{RecordListQuery, RecordRepository, RepoError};
use crate::security::access::{AccessError, AccessGuard, AccessOperation};
use log::warn;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Record service errors: access denials or repository failures.
#[derive(Debug)]
pub enum ServiceError {
    Access(AccessError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Access(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<AccessError> for ServiceError {
    fn from(value: AccessError) -> Self {
        Self::Access(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service wrapper combining a repository with access checks.
///
/// The service acts on behalf of one group; each entry point maps to one
/// access operation on `simple.model`.
pub struct RecordService<R: RecordRepository> {
    repo: R,
    guard: AccessGuard,
    group: String,
}

impl<R: RecordRepository> RecordService<R> {
    /// Creates a service acting for `group` under the provided guard.
    pub fn new(repo: R, guard: AccessGuard, group: impl Into<String>) -> Self {
        Self {
            repo,
            guard,
            group: group.into(),
        }
    }

    /// Returns the group this service acts for.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Creates a new record through repository persistence.
    pub fn create_record(&self, record: &Record) -> ServiceResult<RecordId> {
        self.assert_allowed(AccessOperation::Create)?;
        Ok(self.repo.create_record(record)?)
    }

    /// Creates a record from a field-name-to-value mapping.
    ///
    /// # Contract
    /// - `name` must be present and non-empty; `active` defaults to `true`.
    /// - Returns the persisted record with its assigned stable ID.
    pub fn create_from_values(
        &self,
        values: &BTreeMap<String, FieldValue>,
    ) -> ServiceResult<Record> {
        self.assert_allowed(AccessOperation::Create)?;
        let record = Record::from_values(values).map_err(RepoError::Validation)?;
        self.repo.create_record(&record)?;
        Ok(record)
    }

    /// Updates an existing record by stable ID.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update_record(&self, record: &Record) -> ServiceResult<()> {
        self.assert_allowed(AccessOperation::Write)?;
        Ok(self.repo.update_record(record)?)
    }

    /// Gets one record by ID with optional archived-row visibility.
    pub fn get_record(
        &self,
        id: RecordId,
        include_archived: bool,
    ) -> ServiceResult<Option<Record>> {
        self.assert_allowed(AccessOperation::Read)?;
        Ok(self.repo.get_record(id, include_archived)?)
    }

    /// Lists records using filter and pagination options.
    pub fn list_records(&self, query: &RecordListQuery) -> ServiceResult<Vec<Record>> {
        self.assert_allowed(AccessOperation::Read)?;
        Ok(self.repo.list_records(query)?)
    }

    /// Archives a record by ID, hiding it from default reads.
    pub fn archive_record(&self, id: RecordId) -> ServiceResult<()> {
        self.assert_allowed(AccessOperation::Unlink)?;
        Ok(self.repo.archive_record(id)?)
    }

    fn assert_allowed(&self, operation: AccessOperation) -> Result<(), AccessError> {
        self.guard
            .assert_allowed(RECORD_MODEL, &self.group, operation)
            .map_err(|err| {
                warn!(
                    "event=access_denied module=service group={} operation={operation} error={err}",
                    self.group
                );
                err
            })
    }
}

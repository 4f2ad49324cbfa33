//! Access rule persistence over the `access_rules` table.
//!
//! # Responsibility
//! - Install parsed access rules as module data.
//! - Load the persisted rule set back into an `AccessGuard`.
//!
//! # Invariants
//! - The `(model, group_name)` uniqueness constraint is surfaced as a
//!   semantic duplicate-rule error, not a raw SQLite failure.

use crate::db::DbError;
use crate::security::access::{AccessGuard, AccessRule};
use rusqlite::{params, Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Access rule persistence errors.
#[derive(Debug)]
pub enum AccessRepoError {
    Db(DbError),
    DuplicateRule { model: String, group: String },
    InvalidData(String),
}

impl Display for AccessRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateRule { model, group } => {
                write!(f, "access rule already installed for ({model}, {group})")
            }
            Self::InvalidData(message) => {
                write!(f, "invalid persisted access rule data: {message}")
            }
        }
    }
}

impl Error for AccessRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for AccessRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// SQLite-backed access rule repository.
pub struct SqliteAccessRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccessRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Installs rules into `access_rules`, one row per rule.
    ///
    /// Returns the number of installed rows. The batch is atomic: either
    /// every rule is installed or none is. Re-installing an existing
    /// `(model, group)` pair fails with `DuplicateRule` and rolls the
    /// whole batch back.
    pub fn install_rules(&self, rules: &[AccessRule]) -> Result<usize, AccessRepoError> {
        let tx = self.conn.unchecked_transaction()?;

        for rule in rules {
            let inserted = tx.execute(
                "INSERT INTO access_rules (
                    id,
                    model,
                    group_name,
                    perm_read,
                    perm_write,
                    perm_create,
                    perm_unlink
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    rule.id.as_str(),
                    rule.model.as_str(),
                    rule.group.as_str(),
                    i64::from(rule.perm_read),
                    i64::from(rule.perm_write),
                    i64::from(rule.perm_create),
                    i64::from(rule.perm_unlink),
                ],
            );

            if let Err(err) = inserted {
                if is_constraint_violation(&err) {
                    return Err(AccessRepoError::DuplicateRule {
                        model: rule.model.clone(),
                        group: rule.group.clone(),
                    });
                }
                return Err(err.into());
            }
        }

        tx.commit()?;
        Ok(rules.len())
    }

    /// Loads all persisted rules.
    pub fn load_rules(&self) -> Result<Vec<AccessRule>, AccessRepoError> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                model,
                group_name,
                perm_read,
                perm_write,
                perm_create,
                perm_unlink
            FROM access_rules
            ORDER BY model ASC, group_name ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut rules = Vec::new();
        while let Some(row) = rows.next()? {
            rules.push(AccessRule {
                id: row.get("id")?,
                model: row.get("model")?,
                group: row.get("group_name")?,
                perm_read: parse_flag(row.get("perm_read")?, "perm_read")?,
                perm_write: parse_flag(row.get("perm_write")?, "perm_write")?,
                perm_create: parse_flag(row.get("perm_create")?, "perm_create")?,
                perm_unlink: parse_flag(row.get("perm_unlink")?, "perm_unlink")?,
            });
        }

        Ok(rules)
    }

    /// Loads persisted rules into a ready-to-use guard.
    pub fn load_guard(&self) -> Result<AccessGuard, AccessRepoError> {
        // Duplicates cannot survive the table's uniqueness constraint, so a
        // guard build failure here means corrupted storage.
        AccessGuard::from_rules(self.load_rules()?)
            .map_err(|err| AccessRepoError::InvalidData(err.to_string()))
    }
}

fn parse_flag(value: i64, column: &'static str) -> Result<bool, AccessRepoError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(AccessRepoError::InvalidData(format!(
            "invalid flag value `{other}` in access_rules.{column}"
        ))),
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
    )
}

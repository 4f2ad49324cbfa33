//! Access rule table and deny-by-default permission guard.
//!
//! # Responsibility
//! - Parse the module's access CSV into typed rules.
//! - Answer per-operation permission checks for (model, group) pairs.
//!
//! # Invariants
//! - At most one rule per (model, group) pair.
//! - A missing rule denies every operation; permissions are never implied.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Access file shipped with the module, granting the base user group full
/// permissions on `simple.model`.
pub const RECORD_ACCESS_CSV: &str = include_str!("record_access.csv");

const ACCESS_CSV_HEADER: &str = "id,model,group,perm_read,perm_write,perm_create,perm_unlink";
const ACCESS_CSV_FIELD_COUNT: usize = 7;

/// Record operation subject to an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessOperation {
    Read,
    Write,
    Create,
    Unlink,
}

impl AccessOperation {
    /// Stable string id used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Create => "create",
            Self::Unlink => "unlink",
        }
    }
}

impl Display for AccessOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the access table: permissions one group holds on one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    /// Stable rule identifier, unique within the module.
    pub id: String,
    /// Technical model name the rule applies to.
    pub model: String,
    /// Group the rule grants permissions to.
    pub group: String,
    pub perm_read: bool,
    pub perm_write: bool,
    pub perm_create: bool,
    pub perm_unlink: bool,
}

impl AccessRule {
    /// Returns whether this rule grants the given operation.
    pub fn allows(&self, operation: AccessOperation) -> bool {
        match operation {
            AccessOperation::Read => self.perm_read,
            AccessOperation::Write => self.perm_write,
            AccessOperation::Create => self.perm_create,
            AccessOperation::Unlink => self.perm_unlink,
        }
    }
}

/// Parses an access CSV document into typed rules.
///
/// # Contract
/// - First non-empty line must be the canonical header.
/// - Flag fields accept `0` or `1` only.
/// - Duplicate (model, group) pairs are rejected.
pub fn parse_access_csv(input: &str) -> Result<Vec<AccessRule>, AccessCsvError> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    match lines.next() {
        Some((_, header)) if header == ACCESS_CSV_HEADER => {}
        Some((line_number, header)) => {
            return Err(AccessCsvError::InvalidHeader {
                line: line_number,
                header: header.to_string(),
            });
        }
        None => return Err(AccessCsvError::MissingHeader),
    }

    let mut rules = Vec::new();
    let mut seen = BTreeMap::<(String, String), usize>::new();

    for (line_number, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != ACCESS_CSV_FIELD_COUNT {
            return Err(AccessCsvError::WrongFieldCount {
                line: line_number,
                expected: ACCESS_CSV_FIELD_COUNT,
                actual: fields.len(),
            });
        }

        let rule = AccessRule {
            id: require_field(line_number, "id", fields[0])?,
            model: require_field(line_number, "model", fields[1])?,
            group: require_field(line_number, "group", fields[2])?,
            perm_read: parse_flag(line_number, "perm_read", fields[3])?,
            perm_write: parse_flag(line_number, "perm_write", fields[4])?,
            perm_create: parse_flag(line_number, "perm_create", fields[5])?,
            perm_unlink: parse_flag(line_number, "perm_unlink", fields[6])?,
        };

        let key = (rule.model.clone(), rule.group.clone());
        if seen.insert(key, line_number).is_some() {
            return Err(AccessCsvError::DuplicateRule {
                line: line_number,
                model: rule.model,
                group: rule.group,
            });
        }
        rules.push(rule);
    }

    Ok(rules)
}

fn require_field(
    line: usize,
    field: &'static str,
    value: &str,
) -> Result<String, AccessCsvError> {
    if value.is_empty() {
        return Err(AccessCsvError::EmptyField { line, field });
    }
    Ok(value.to_string())
}

fn parse_flag(line: usize, field: &'static str, value: &str) -> Result<bool, AccessCsvError> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(AccessCsvError::InvalidFlag {
            line,
            field,
            value: other.to_string(),
        }),
    }
}

/// Access CSV parse errors, carrying 1-based line numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessCsvError {
    MissingHeader,
    InvalidHeader {
        line: usize,
        header: String,
    },
    WrongFieldCount {
        line: usize,
        expected: usize,
        actual: usize,
    },
    EmptyField {
        line: usize,
        field: &'static str,
    },
    InvalidFlag {
        line: usize,
        field: &'static str,
        value: String,
    },
    DuplicateRule {
        line: usize,
        model: String,
        group: String,
    },
}

impl Display for AccessCsvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "access csv is missing its header line"),
            Self::InvalidHeader { line, header } => {
                write!(f, "access csv line {line}: unexpected header `{header}`")
            }
            Self::WrongFieldCount {
                line,
                expected,
                actual,
            } => write!(
                f,
                "access csv line {line}: expected {expected} fields, got {actual}"
            ),
            Self::EmptyField { line, field } => {
                write!(f, "access csv line {line}: field `{field}` must not be empty")
            }
            Self::InvalidFlag { line, field, value } => write!(
                f,
                "access csv line {line}: field `{field}` expects 0 or 1, got `{value}`"
            ),
            Self::DuplicateRule { line, model, group } => write!(
                f,
                "access csv line {line}: duplicate rule for ({model}, {group})"
            ),
        }
    }
}

impl Error for AccessCsvError {}

/// Deny-by-default permission guard over a rule set.
#[derive(Debug, Default)]
pub struct AccessGuard {
    rules: BTreeMap<(String, String), AccessRule>,
}

impl AccessGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a guard from parsed rules.
    pub fn from_rules(
        rules: impl IntoIterator<Item = AccessRule>,
    ) -> Result<Self, AccessError> {
        let mut guard = Self::new();
        for rule in rules {
            guard.insert_rule(rule)?;
        }
        Ok(guard)
    }

    /// Inserts one rule, rejecting duplicate (model, group) pairs.
    pub fn insert_rule(&mut self, rule: AccessRule) -> Result<(), AccessError> {
        let key = (rule.model.clone(), rule.group.clone());
        if self.rules.contains_key(&key) {
            return Err(AccessError::DuplicateRule {
                model: rule.model,
                group: rule.group,
            });
        }
        self.rules.insert(key, rule);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the rule for one (model, group) pair, if declared.
    pub fn rule_for(&self, model: &str, group: &str) -> Option<&AccessRule> {
        self.rules
            .get(&(model.to_string(), group.to_string()))
    }

    /// Asserts that `group` may perform `operation` on `model`.
    ///
    /// # Contract
    /// - No declared rule denies every operation.
    /// - A declared rule denies operations whose flag is 0.
    pub fn assert_allowed(
        &self,
        model: &str,
        group: &str,
        operation: AccessOperation,
    ) -> Result<(), AccessError> {
        match self.rule_for(model, group) {
            None => Err(AccessError::NoRule {
                model: model.to_string(),
                group: group.to_string(),
            }),
            Some(rule) if rule.allows(operation) => Ok(()),
            Some(_) => Err(AccessError::OperationDenied {
                model: model.to_string(),
                group: group.to_string(),
                operation,
            }),
        }
    }
}

/// Access check and guard construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    DuplicateRule {
        model: String,
        group: String,
    },
    NoRule {
        model: String,
        group: String,
    },
    OperationDenied {
        model: String,
        group: String,
        operation: AccessOperation,
    },
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRule { model, group } => {
                write!(f, "access rule already declared for ({model}, {group})")
            }
            Self::NoRule { model, group } => {
                write!(f, "no access rule for group {group} on model {model}")
            }
            Self::OperationDenied {
                model,
                group,
                operation,
            } => write!(
                f,
                "group {group} is not allowed to {operation} on model {model}"
            ),
        }
    }
}

impl Error for AccessError {}

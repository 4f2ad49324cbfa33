//! Record domain model.
//!
//! # Responsibility
//! - Define the canonical record shape for the `simple.model` entity.
//! - Provide mapping-based construction and active-flag lifecycle helpers.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another record.
//! - `name` is required and non-empty after trimming.
//! - `active` is the source of truth for visibility; records are archived,
//!   never hard-deleted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Technical model name, used as the subject of access rules.
pub const RECORD_MODEL: &str = "simple.model";

/// Stable identifier for every persisted record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RecordId = Uuid;

/// Scalar value accepted by mapping-based record construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
}

/// Canonical record for the `simple.model` entity.
///
/// The demo scalar fields (`test_field`, `gta`, `sdsd`, `test_integer`)
/// carry no business meaning; they exist to exercise each supported scalar
/// field type end to end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordData")]
pub struct Record {
    /// Stable global ID used for lookup and auditing.
    pub uuid: RecordId,
    /// Required display name; must stay non-empty.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Visibility flag; `false` means archived.
    pub active: bool,
    /// Demo text field.
    pub test_field: Option<String>,
    /// Demo text field.
    pub gta: Option<String>,
    /// Demo text field.
    pub sdsd: Option<String>,
    /// Demo integer field.
    pub test_integer: Option<i64>,
}

/// Wire-shape twin of `Record` used to re-run validation on deserialize.
#[derive(Deserialize)]
struct RecordData {
    uuid: RecordId,
    name: String,
    description: Option<String>,
    active: bool,
    test_field: Option<String>,
    gta: Option<String>,
    sdsd: Option<String>,
    test_integer: Option<i64>,
}

impl TryFrom<RecordData> for Record {
    type Error = RecordValidationError;

    fn try_from(data: RecordData) -> Result<Self, Self::Error> {
        let record = Self {
            uuid: data.uuid,
            name: data.name,
            description: data.description,
            active: data.active,
            test_field: data.test_field,
            gta: data.gta,
            sdsd: data.sdsd,
            test_integer: data.test_integer,
        };
        record.validate()?;
        Ok(record)
    }
}

impl Record {
    /// Creates a new record with a generated stable ID.
    ///
    /// # Invariants
    /// - Optional fields are initialized to `None`.
    /// - `active` starts as `true`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            description: None,
            active: true,
            test_field: None,
            gta: None,
            sdsd: None,
            test_integer: None,
        }
    }

    /// Creates a new record with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        uuid: RecordId,
        name: impl Into<String>,
    ) -> Result<Self, RecordValidationError> {
        if uuid.is_nil() {
            return Err(RecordValidationError::NilUuid);
        }
        let mut record = Self::new(name);
        record.uuid = uuid;
        Ok(record)
    }

    /// Builds a record from a field-name-to-value mapping.
    ///
    /// # Contract
    /// - `name` must be present, of text type, and non-empty.
    /// - Unknown field names are rejected rather than silently dropped.
    /// - `active` defaults to `true` when omitted.
    pub fn from_values(
        values: &BTreeMap<String, FieldValue>,
    ) -> Result<Self, RecordValidationError> {
        let name = match values.get("name") {
            Some(value) => expect_text("name", value)?,
            None => return Err(RecordValidationError::MissingName),
        };

        let mut record = Self::new(name);
        for (field, value) in values {
            match field.as_str() {
                "name" => {}
                "description" => record.description = Some(expect_text("description", value)?),
                "active" => record.active = expect_boolean("active", value)?,
                "test_field" => record.test_field = Some(expect_text("test_field", value)?),
                "gta" => record.gta = Some(expect_text("gta", value)?),
                "sdsd" => record.sdsd = Some(expect_text("sdsd", value)?),
                "test_integer" => {
                    record.test_integer = Some(expect_integer("test_integer", value)?);
                }
                other => return Err(RecordValidationError::UnknownField(other.to_string())),
            }
        }

        record.validate()?;
        Ok(record)
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.uuid.is_nil() {
            return Err(RecordValidationError::NilUuid);
        }
        if self.name.trim().is_empty() {
            return Err(RecordValidationError::EmptyName);
        }
        Ok(())
    }

    /// Hides this record from default reads without destroying it.
    pub fn archive(&mut self) {
        self.active = false;
    }

    /// Makes an archived record visible again.
    pub fn restore(&mut self) {
        self.active = true;
    }

    /// Returns whether this record is visible to default reads.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

fn expect_text(
    field: &'static str,
    value: &FieldValue,
) -> Result<String, RecordValidationError> {
    match value {
        FieldValue::Text(v) => Ok(v.clone()),
        _ => Err(RecordValidationError::FieldTypeMismatch {
            field,
            expected: "text",
        }),
    }
}

fn expect_boolean(field: &'static str, value: &FieldValue) -> Result<bool, RecordValidationError> {
    match value {
        FieldValue::Boolean(v) => Ok(*v),
        _ => Err(RecordValidationError::FieldTypeMismatch {
            field,
            expected: "boolean",
        }),
    }
}

fn expect_integer(field: &'static str, value: &FieldValue) -> Result<i64, RecordValidationError> {
    match value {
        FieldValue::Integer(v) => Ok(*v),
        _ => Err(RecordValidationError::FieldTypeMismatch {
            field,
            expected: "integer",
        }),
    }
}

/// Record field validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    MissingName,
    EmptyName,
    NilUuid,
    UnknownField(String),
    FieldTypeMismatch {
        field: &'static str,
        expected: &'static str,
    },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "record field `name` is required"),
            Self::EmptyName => write!(f, "record field `name` must not be empty"),
            Self::NilUuid => write!(f, "record uuid must not be nil"),
            Self::UnknownField(field) => write!(f, "unknown record field: {field}"),
            Self::FieldTypeMismatch { field, expected } => {
                write!(f, "record field `{field}` expects a {expected} value")
            }
        }
    }
}

impl Error for RecordValidationError {}

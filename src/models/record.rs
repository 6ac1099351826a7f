//! Validated intake record and its typed field values
//!
//! An [`IntakeRecord`] only ever exists in fully-validated form: the struct
//! cannot be built outside this crate, so the validation engine (and the
//! unseal path, which round-trips previously validated data) are the only
//! producers. Once built a record is immutable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Date format used throughout the intake form (US convention)
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// A typed field value
///
/// The closed set of value shapes a field can take. Every consumer matches
/// exhaustively; there is no dynamic dispatch on field contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Free-form text (names, addresses, identifiers)
    Text(String),
    /// A calendar date (dates of birth, signature dates)
    Date(NaiveDate),
    /// A monetary amount in cents
    Amount(Money),
    /// A selection from an enumerated set
    Choice(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            FieldValue::Amount(m) => write!(f, "{}", m),
            FieldValue::Choice(s) => write!(f, "{}", s),
        }
    }
}

/// One field of a validated record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordField {
    /// Schema field name (e.g. "ssn")
    pub name: String,
    /// The validated, typed value
    pub value: FieldValue,
}

/// A fully validated client intake record
///
/// Fields are stored in schema order. Optional fields the client left blank
/// are simply absent; the document generator renders them as "[Not provided]".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeRecord {
    fields: Vec<RecordField>,
}

impl IntakeRecord {
    /// Build a record from already-validated fields.
    ///
    /// Crate-private: only the validation engine and the unseal path may
    /// construct records.
    pub(crate) fn from_fields(fields: Vec<RecordField>) -> Self {
        Self { fields }
    }

    /// Look up a field value by schema name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    /// Iterate fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = &RecordField> {
        self.fields.iter()
    }

    /// Number of populated fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no populated fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single validation violation: which field failed and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Schema field name ("ssn"), or a group name for cross-field rules
    /// ("phone_numbers")
    pub field: String,
    /// Human-readable reason, suitable for inline display next to the field
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// The outcome of validating raw form input
///
/// Either a valid record or the complete ordered list of violations,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Every field passed; the record is ready to seal or render
    Valid(IntakeRecord),
    /// At least one rule failed; contains every violation found
    Invalid(Vec<Violation>),
}

impl ValidationResult {
    /// Whether validation produced a record
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The validated record, if any
    pub fn record(&self) -> Option<&IntakeRecord> {
        match self {
            Self::Valid(r) => Some(r),
            Self::Invalid(_) => None,
        }
    }

    /// Consume the result, returning the record if valid
    pub fn into_record(self) -> Option<IntakeRecord> {
        match self {
            Self::Valid(r) => Some(r),
            Self::Invalid(_) => None,
        }
    }

    /// The violations, empty when valid
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Valid(_) => &[],
            Self::Invalid(v) => v,
        }
    }

    /// Formatted multi-line summary of all violations for display
    pub fn summary(&self) -> String {
        match self {
            Self::Valid(_) => String::new(),
            Self::Invalid(violations) => {
                let mut out = String::from("Please correct the following errors:\n");
                for v in violations {
                    out.push_str(&format!("  - {}\n", v));
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> IntakeRecord {
        IntakeRecord::from_fields(vec![
            RecordField {
                name: "full_name".into(),
                value: FieldValue::Text("Jordan Avery".into()),
            },
            RecordField {
                name: "dob".into(),
                value: FieldValue::Date(NaiveDate::from_ymd_opt(1975, 3, 14).unwrap()),
            },
            RecordField {
                name: "net_worth".into(),
                value: FieldValue::Amount(Money::from_cents(125_000_000)),
            },
        ])
    }

    #[test]
    fn test_get_and_order() {
        let record = sample_record();
        assert_eq!(
            record.get("full_name"),
            Some(&FieldValue::Text("Jordan Avery".into()))
        );
        assert!(record.get("missing").is_none());
        let names: Vec<&str> = record.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["full_name", "dob", "net_worth"]);
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(
            FieldValue::Date(NaiveDate::from_ymd_opt(1975, 3, 14).unwrap()).to_string(),
            "03/14/1975"
        );
        assert_eq!(
            FieldValue::Amount(Money::from_cents(1_050)).to_string(),
            "$10.50"
        );
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: IntakeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_validation_result_accessors() {
        let valid = ValidationResult::Valid(sample_record());
        assert!(valid.is_valid());
        assert!(valid.violations().is_empty());
        assert!(valid.summary().is_empty());

        let invalid = ValidationResult::Invalid(vec![Violation::new("ssn", "This field is required")]);
        assert!(!invalid.is_valid());
        assert!(invalid.record().is_none());
        assert_eq!(invalid.violations().len(), 1);
        assert!(invalid.summary().contains("ssn: This field is required"));
    }
}

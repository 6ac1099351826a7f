//! Field specification types
//!
//! A [`FieldSpec`] is static metadata about one form field: its type, whether
//! it is required, whether it is sensitive (encrypted at rest), the rule it
//! must satisfy, and the report section it renders under. The full table is
//! built once at startup (see [`super::client_intake`]) and passed by
//! reference into the validation engine.

use crate::models::Money;

/// Report/form section a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Identity,
    Contact,
    Employment,
    Spouse,
    Financial,
    TrustedContact,
    Disclosures,
}

impl Section {
    /// Section heading as it appears on the rendered report
    pub fn title(&self) -> &'static str {
        match self {
            Section::Identity => "Personal Information",
            Section::Contact => "Contact Information",
            Section::Employment => "Employment Information",
            Section::Spouse => "Spouse/Partner Information",
            Section::Financial => "Financial Profile",
            Section::TrustedContact => "Trusted Contact Information",
            Section::Disclosures => "Regulatory Disclosures",
        }
    }

    /// All sections in report order
    pub fn all() -> &'static [Section] {
        &[
            Section::Identity,
            Section::Contact,
            Section::Employment,
            Section::Spouse,
            Section::Financial,
            Section::TrustedContact,
            Section::Disclosures,
        ]
    }
}

/// The data type a field coerces to during validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Free-form text
    Text,
    /// MM/DD/YYYY date
    Date,
    /// Monetary amount ("$1,234.56" and friends)
    Amount,
    /// One of a fixed set of values
    Choice(&'static [&'static str]),
}

/// Format/range rule applied after type coercion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    /// No rule beyond the type itself
    None,
    /// US Social Security Number: 9 digits, not a known-invalid pattern
    Ssn,
    /// US phone number: 10 digits after stripping formatting
    Phone,
    /// Email address shape
    Email,
    /// Exactly this many digits after stripping separators
    Digits(usize),
    /// Date must put the subject's age inside this window (inclusive)
    AgeRange { min: u32, max: u32 },
    /// Amount must fall inside this window (inclusive)
    AmountRange { min: Money, max: Money },
    /// Text must parse as an integer inside this window (inclusive)
    IntegerRange { min: i64, max: i64 },
}

/// Static metadata for one intake form field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Stable machine name, used as the key in raw input and records
    pub name: &'static str,
    /// Human-readable label, used in violations and on the report
    pub label: &'static str,
    /// Report section
    pub section: Section,
    /// Value type
    pub field_type: FieldType,
    /// Whether the field must be present and non-blank
    pub required: bool,
    /// Whether the field is PII/financial-identifying (encrypted at rest)
    pub sensitive: bool,
    /// Format/range rule
    pub rule: FieldRule,
}

/// A rule spanning more than one field, evaluated after per-field checks
#[derive(Debug, Clone, Copy)]
pub enum CrossRule {
    /// When `trigger` holds any of `equals_any`, every field in `required`
    /// must be present
    RequireWhenEquals {
        trigger: &'static str,
        equals_any: &'static [&'static str],
        required: &'static [&'static str],
    },
    /// At least one of `fields` must be present
    AnyOf {
        /// Group name reported as the violation's field
        group: &'static str,
        fields: &'static [&'static str],
        message: &'static str,
    },
}

/// The fixed intake schema: ordered field specs plus cross-field rules
#[derive(Debug, Clone)]
pub struct IntakeSchema {
    fields: Vec<FieldSpec>,
    cross_rules: Vec<CrossRule>,
}

impl IntakeSchema {
    pub(crate) fn new(fields: Vec<FieldSpec>, cross_rules: Vec<CrossRule>) -> Self {
        Self {
            fields,
            cross_rules,
        }
    }

    /// Look up a field spec by machine name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterate field specs in schema (and report) order
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    /// Cross-field rules in evaluation order
    pub fn cross_rules(&self) -> &[CrossRule] {
        &self.cross_rules
    }

    /// Fields belonging to one report section, in schema order
    pub fn section_fields(&self, section: Section) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(move |f| f.section == section)
    }
}

//! The validation engine
//!
//! Takes raw string-keyed form input and the intake schema and produces
//! either a fully validated [`IntakeRecord`] or the complete list of
//! violations. All violations are collected in one pass rather than failing
//! fast, so the caller can present a complete error report.
//!
//! The operation is pure: no I/O, no shared state, no side effects.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};

use crate::models::{FieldValue, IntakeRecord, Money, RecordField, ValidationResult, Violation, DATE_FORMAT};
use crate::schema::{CrossRule, FieldRule, FieldSpec, FieldType, IntakeSchema};

use super::rules;

/// Raw form input as delivered by the UI layer: field name to entered text.
///
/// Empty and whitespace-only values are treated as absent.
pub type RawInput = BTreeMap<String, String>;

/// Validate raw form input against the schema.
///
/// Returns a record only when zero violations remain. Malformed input
/// (unknown field names, unparseable values) is reported as violations,
/// never as a panic or error.
pub fn validate(raw: &RawInput, schema: &IntakeSchema) -> ValidationResult {
    validate_as_of(raw, schema, Utc::now().date_naive())
}

/// Validation with an explicit "today" for age checks.
///
/// Exposed for deterministic testing; production callers use [`validate`].
pub fn validate_as_of(raw: &RawInput, schema: &IntakeSchema, today: NaiveDate) -> ValidationResult {
    let mut violations = Vec::new();
    let mut fields = Vec::new();
    let mut rejected: Vec<&str> = Vec::new();

    // Per-field pass, in schema order
    for spec in schema.fields() {
        let value = raw.get(spec.name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let Some(value) = value else {
            if spec.required {
                violations.push(Violation::new(spec.name, "This field is required"));
            }
            continue;
        };

        match coerce_and_check(spec, value, today) {
            Ok(field_value) => fields.push(RecordField {
                name: spec.name.to_string(),
                value: field_value,
            }),
            Err(reason) => {
                violations.push(Violation::new(spec.name, reason));
                rejected.push(spec.name);
            }
        }
    }

    // Cross-field pass. A field the client did enter but got a per-field
    // violation for counts as provided here, so it is not reported twice.
    let provided = |name: &str| {
        fields.iter().any(|f| f.name == name) || rejected.contains(&name)
    };
    let text_of = |name: &str| {
        fields.iter().find(|f| f.name == name).map(|f| match &f.value {
            FieldValue::Text(s) | FieldValue::Choice(s) => s.as_str(),
            _ => "",
        })
    };

    for rule in schema.cross_rules() {
        match rule {
            CrossRule::RequireWhenEquals {
                trigger,
                equals_any,
                required,
            } => {
                let Some(current) = text_of(trigger) else {
                    continue;
                };
                if !equals_any.contains(&current) {
                    continue;
                }
                let current = current.to_string();
                for name in *required {
                    if !provided(name) {
                        violations.push(Violation::new(
                            *name,
                            format!("Required when {} is {}", trigger, current),
                        ));
                    }
                }
            }
            CrossRule::AnyOf {
                group,
                fields: members,
                message,
            } => {
                if !members.iter().any(|name| provided(name)) {
                    violations.push(Violation::new(*group, *message));
                }
            }
        }
    }

    // Unknown field names are a data quality issue, not a crash
    for key in raw.keys() {
        if schema.field(key).is_none() {
            violations.push(Violation::new(key.clone(), "Unknown field"));
        }
    }

    if violations.is_empty() {
        ValidationResult::Valid(IntakeRecord::from_fields(fields))
    } else {
        ValidationResult::Invalid(violations)
    }
}

/// Coerce one raw value to its typed form and apply the field's rule
fn coerce_and_check(spec: &FieldSpec, raw: &str, today: NaiveDate) -> Result<FieldValue, String> {
    let value = match spec.field_type {
        FieldType::Text => FieldValue::Text(raw.to_string()),
        FieldType::Date => {
            let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_| "Please enter a valid date (MM/DD/YYYY)".to_string())?;
            FieldValue::Date(date)
        }
        FieldType::Amount => {
            let amount =
                Money::parse(raw).map_err(|_| "Please enter a valid amount".to_string())?;
            FieldValue::Amount(amount)
        }
        FieldType::Choice(options) => {
            if !options.contains(&raw) {
                return Err(format!("Please select a valid {}", spec.label));
            }
            FieldValue::Choice(raw.to_string())
        }
    };

    match (spec.rule, &value) {
        (FieldRule::None, _) => Ok(value),
        (FieldRule::Ssn, FieldValue::Text(s)) => Ok(FieldValue::Text(rules::check_ssn(s)?)),
        (FieldRule::Phone, FieldValue::Text(s)) => Ok(FieldValue::Text(rules::check_phone(s)?)),
        (FieldRule::Email, FieldValue::Text(s)) => {
            rules::check_email(s)?;
            Ok(value)
        }
        (FieldRule::Digits(width), FieldValue::Text(s)) => {
            Ok(FieldValue::Text(rules::check_digits(s, width)?))
        }
        (FieldRule::AgeRange { min, max }, FieldValue::Date(d)) => {
            rules::check_age(*d, today, min, max)?;
            Ok(value)
        }
        (FieldRule::AmountRange { min, max }, FieldValue::Amount(m)) => {
            if *m < min {
                return Err(format!("Value must be at least {}", min));
            }
            if *m > max {
                return Err(format!("Value cannot exceed {}", max));
            }
            Ok(value)
        }
        (FieldRule::IntegerRange { min, max }, FieldValue::Text(s)) => {
            let n: i64 = s
                .parse()
                .map_err(|_| "Please enter a whole number".to_string())?;
            if n < min || n > max {
                return Err(format!("Value must be between {} and {}", min, max));
            }
            Ok(FieldValue::Text(n.to_string()))
        }
        // Schema construction pairs each rule with a compatible type; a
        // mismatch is a programmer error in the schema table.
        (rule, _) => unreachable!("rule {:?} applied to incompatible field {}", rule, spec.name),
    }
}

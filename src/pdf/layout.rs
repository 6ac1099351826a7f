//! Report layout: from a validated record to a flat list of lines
//!
//! The report is a fixed multi-section document driven entirely by the
//! schema's section order. Optional fields the client left blank are shown
//! as "[Not provided]" so the document is audit-complete; fields that only
//! apply under a condition (mailing address, retirement details, spouse
//! section) are omitted when the condition does not hold, matching the firm's
//! paper form.

use crate::models::{FieldValue, IntakeRecord};
use crate::schema::{IntakeSchema, Section};

/// Placeholder for blank optional fields
pub const NOT_PROVIDED: &str = "[Not provided]";

/// Report document title
pub const REPORT_TITLE: &str = "Magnus Client Intake Report";

/// One line of the laid-out report body
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Section heading (bold)
    SectionTitle(String),
    /// "Label: value" body line
    Field { label: String, value: String },
    /// Free text (signature block)
    Text(String),
    /// Vertical gap
    Blank,
}

/// Lay out the full report body in section order, ending with the
/// signature block.
pub fn build_lines(record: &IntakeRecord, schema: &IntakeSchema) -> Vec<Line> {
    let mut lines = Vec::new();

    for section in Section::all() {
        if !section_visible(*section, record) {
            continue;
        }

        lines.push(Line::SectionTitle(section.title().to_string()));
        for spec in schema.section_fields(*section) {
            if !field_visible(spec.name, record) {
                continue;
            }
            let value = record
                .get(spec.name)
                .map(FieldValue::to_string)
                .unwrap_or_else(|| NOT_PROVIDED.to_string());
            lines.push(Line::Field {
                label: spec.label.to_string(),
                value,
            });
        }
        lines.push(Line::Blank);
    }

    lines.push(Line::SectionTitle("Signatures".to_string()));
    lines.push(Line::Text(
        "Client Signature: _________________________    Date: ____________".to_string(),
    ));
    lines.push(Line::Text(
        "Advisor Signature: ________________________    Date: ____________".to_string(),
    ));

    lines
}

fn choice_is(record: &IntakeRecord, field: &str, expected: &str) -> bool {
    matches!(record.get(field), Some(FieldValue::Choice(v)) if v == expected)
}

fn section_visible(section: Section, record: &IntakeRecord) -> bool {
    match section {
        Section::Spouse => choice_is(record, "spouse_applicable", "Yes"),
        _ => true,
    }
}

fn field_visible(name: &str, record: &IntakeRecord) -> bool {
    match name {
        "mailing_address" => choice_is(record, "mailing_address_different", "Yes"),
        "former_employer" | "retirement_income_source" => {
            choice_is(record, "employment_status", "Retired")
        }
        _ => true,
    }
}

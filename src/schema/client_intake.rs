//! The fixed client intake schema
//!
//! One schema, one document class. Field inventory and enumerated sets match
//! the firm's intake form; sensitive fields (SSNs, outside account numbers)
//! are flagged for encryption at rest.

use crate::models::Money;

use super::spec::{CrossRule, FieldRule, FieldSpec, FieldType, IntakeSchema, Section};

const MARITAL_STATUSES: &[&str] = &[
    "Single",
    "Married",
    "Divorced",
    "Widowed",
    "Domestic Partnership",
];

const CITIZENSHIP: &[&str] = &["US Citizen", "Resident Alien", "Non-Resident Alien"];

const EMPLOYMENT_STATUSES: &[&str] = &[
    "Employed",
    "Self-Employed",
    "Retired",
    "Unemployed",
    "Student",
    "Homemaker",
];

const TAX_BRACKETS: &[&str] = &["0-15%", "15%-32%", "32%+", "Not sure", "Prefer not to answer"];

const EDUCATION_LEVELS: &[&str] = &[
    "High School",
    "Some College",
    "Associate Degree",
    "Bachelor's Degree",
    "Master's Degree",
    "Doctoral Degree",
    "Professional Degree",
    "Other",
    "Prefer not to answer",
];

const RISK_TOLERANCES: &[&str] = &[
    "Conservative",
    "Moderate",
    "Moderate Aggressive",
    "Aggressive",
];

const INVESTMENT_OBJECTIVES: &[&str] = &[
    "Income",
    "Growth and Income",
    "Capital Appreciation",
    "Speculation",
];

const YES_NO: &[&str] = &["Yes", "No"];

/// Annual income sanity cap: $100M
const INCOME_CAP: Money = Money::from_cents(100_000_000_00);

impl IntakeSchema {
    /// Build the fixed client intake schema.
    ///
    /// Construct once at startup and pass by reference; the table is
    /// immutable and safe to share across threads for reads.
    pub fn client_intake() -> Self {
        let fields = vec![
            // Personal information
            spec("full_name", "Full Name", Section::Identity)
                .required()
                .build(),
            FieldSpec {
                field_type: FieldType::Date,
                rule: FieldRule::AgeRange { min: 18, max: 120 },
                ..spec("dob", "Date of Birth", Section::Identity)
                    .required()
                    .build()
            },
            FieldSpec {
                rule: FieldRule::Ssn,
                ..spec("ssn", "Social Security Number", Section::Identity)
                    .required()
                    .sensitive()
                    .build()
            },
            FieldSpec {
                field_type: FieldType::Choice(CITIZENSHIP),
                ..spec("citizenship", "Citizenship", Section::Identity)
                    .required()
                    .build()
            },
            FieldSpec {
                field_type: FieldType::Choice(MARITAL_STATUSES),
                ..spec("marital_status", "Marital Status", Section::Identity).build()
            },
            // Contact information
            spec(
                "residential_address",
                "Residential Address",
                Section::Contact,
            )
            .required()
            .build(),
            FieldSpec {
                field_type: FieldType::Choice(YES_NO),
                ..spec(
                    "mailing_address_different",
                    "Mailing Address Different",
                    Section::Contact,
                )
                .build()
            },
            spec("mailing_address", "Mailing Address", Section::Contact).build(),
            FieldSpec {
                rule: FieldRule::Phone,
                ..spec("home_phone", "Home Phone", Section::Contact).build()
            },
            FieldSpec {
                rule: FieldRule::Phone,
                ..spec("work_phone", "Work Phone", Section::Contact).build()
            },
            FieldSpec {
                rule: FieldRule::Phone,
                ..spec("mobile_phone", "Mobile Phone", Section::Contact).build()
            },
            FieldSpec {
                rule: FieldRule::Email,
                ..spec("email", "Email Address", Section::Contact).build()
            },
            // Employment information
            FieldSpec {
                field_type: FieldType::Choice(EMPLOYMENT_STATUSES),
                ..spec("employment_status", "Employment Status", Section::Employment)
                    .required()
                    .build()
            },
            spec("employer_name", "Employer Name", Section::Employment).build(),
            spec("occupation", "Occupation/Title", Section::Employment).build(),
            FieldSpec {
                rule: FieldRule::IntegerRange { min: 0, max: 70 },
                ..spec("years_employed", "Years Employed", Section::Employment).build()
            },
            FieldSpec {
                field_type: FieldType::Amount,
                rule: FieldRule::AmountRange {
                    min: Money::zero(),
                    max: INCOME_CAP,
                },
                ..spec("annual_income", "Annual Income", Section::Employment).build()
            },
            spec("former_employer", "Former Employer", Section::Employment).build(),
            spec(
                "retirement_income_source",
                "Source of Income",
                Section::Employment,
            )
            .build(),
            // Spouse/partner information
            FieldSpec {
                field_type: FieldType::Choice(YES_NO),
                ..spec("spouse_applicable", "Spouse Applicable", Section::Spouse).build()
            },
            spec("spouse_full_name", "Spouse Full Name", Section::Spouse).build(),
            FieldSpec {
                field_type: FieldType::Date,
                rule: FieldRule::AgeRange { min: 18, max: 120 },
                ..spec("spouse_dob", "Spouse Date of Birth", Section::Spouse).build()
            },
            FieldSpec {
                rule: FieldRule::Ssn,
                ..spec("spouse_ssn", "Spouse SSN", Section::Spouse)
                    .sensitive()
                    .build()
            },
            // Financial profile
            FieldSpec {
                field_type: FieldType::Amount,
                rule: FieldRule::AmountRange {
                    min: Money::zero(),
                    max: Money::from_cents(i64::MAX),
                },
                ..spec(
                    "net_worth",
                    "Net Worth (excluding primary home)",
                    Section::Financial,
                )
                .build()
            },
            FieldSpec {
                field_type: FieldType::Amount,
                rule: FieldRule::AmountRange {
                    min: Money::zero(),
                    max: Money::from_cents(i64::MAX),
                },
                ..spec("liquid_net_worth", "Liquid Net Worth", Section::Financial).build()
            },
            FieldSpec {
                field_type: FieldType::Choice(TAX_BRACKETS),
                ..spec("tax_bracket", "Tax Bracket", Section::Financial).build()
            },
            FieldSpec {
                field_type: FieldType::Choice(EDUCATION_LEVELS),
                ..spec("education_status", "Education Status", Section::Financial).build()
            },
            FieldSpec {
                field_type: FieldType::Choice(RISK_TOLERANCES),
                ..spec("risk_tolerance", "Risk Tolerance", Section::Financial).build()
            },
            FieldSpec {
                field_type: FieldType::Choice(INVESTMENT_OBJECTIVES),
                ..spec(
                    "investment_objectives",
                    "Investment Objectives",
                    Section::Financial,
                )
                .build()
            },
            spec(
                "outside_broker_name",
                "Outside Broker Firm",
                Section::Financial,
            )
            .build(),
            FieldSpec {
                rule: FieldRule::Digits(9),
                ..spec(
                    "outside_broker_account",
                    "Outside Account Number",
                    Section::Financial,
                )
                .sensitive()
                .build()
            },
            // Trusted contact
            FieldSpec {
                field_type: FieldType::Choice(YES_NO),
                ..spec(
                    "trusted_contact_opt_in",
                    "Trusted Contact Opt-In",
                    Section::TrustedContact,
                )
                .build()
            },
            spec(
                "trusted_contact_name",
                "Trusted Contact Name",
                Section::TrustedContact,
            )
            .build(),
            spec(
                "trusted_contact_relationship",
                "Trusted Contact Relationship",
                Section::TrustedContact,
            )
            .build(),
            FieldSpec {
                rule: FieldRule::Phone,
                ..spec(
                    "trusted_contact_phone",
                    "Trusted Contact Phone",
                    Section::TrustedContact,
                )
                .build()
            },
            FieldSpec {
                rule: FieldRule::Email,
                ..spec(
                    "trusted_contact_email",
                    "Trusted Contact Email",
                    Section::TrustedContact,
                )
                .build()
            },
            // Regulatory disclosures
            FieldSpec {
                field_type: FieldType::Choice(YES_NO),
                ..spec(
                    "electronic_delivery_consent",
                    "Electronic Delivery Consent",
                    Section::Disclosures,
                )
                .required()
                .build()
            },
        ];

        let cross_rules = vec![
            CrossRule::RequireWhenEquals {
                trigger: "employment_status",
                equals_any: &["Employed", "Self-Employed"],
                required: &["employer_name", "occupation"],
            },
            CrossRule::RequireWhenEquals {
                trigger: "employment_status",
                equals_any: &["Retired"],
                required: &["former_employer", "retirement_income_source"],
            },
            CrossRule::AnyOf {
                group: "phone_numbers",
                fields: &["home_phone", "work_phone", "mobile_phone"],
                message: "At least one phone number is required",
            },
            CrossRule::RequireWhenEquals {
                trigger: "mailing_address_different",
                equals_any: &["Yes"],
                required: &["mailing_address"],
            },
            CrossRule::RequireWhenEquals {
                trigger: "spouse_applicable",
                equals_any: &["Yes"],
                required: &["spouse_full_name"],
            },
            CrossRule::RequireWhenEquals {
                trigger: "trusted_contact_opt_in",
                equals_any: &["Yes"],
                required: &[
                    "trusted_contact_name",
                    "trusted_contact_relationship",
                    "trusted_contact_phone",
                ],
            },
        ];

        IntakeSchema::new(fields, cross_rules)
    }
}

/// Small builder so the table above stays readable
struct SpecBuilder {
    inner: FieldSpec,
}

fn spec(name: &'static str, label: &'static str, section: Section) -> SpecBuilder {
    SpecBuilder {
        inner: FieldSpec {
            name,
            label,
            section,
            field_type: FieldType::Text,
            required: false,
            sensitive: false,
            rule: FieldRule::None,
        },
    }
}

impl SpecBuilder {
    fn required(mut self) -> Self {
        self.inner.required = true;
        self
    }

    fn sensitive(mut self) -> Self {
        self.inner.sensitive = true;
        self
    }

    fn build(self) -> FieldSpec {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lookups() {
        let schema = IntakeSchema::client_intake();
        let ssn = schema.field("ssn").unwrap();
        assert!(ssn.required);
        assert!(ssn.sensitive);
        assert_eq!(ssn.rule, FieldRule::Ssn);
        assert!(schema.field("no_such_field").is_none());
    }

    #[test]
    fn test_sensitive_inventory() {
        let schema = IntakeSchema::client_intake();
        let sensitive: Vec<&str> = schema
            .fields()
            .filter(|f| f.sensitive)
            .map(|f| f.name)
            .collect();
        assert_eq!(
            sensitive,
            vec!["ssn", "spouse_ssn", "outside_broker_account"]
        );
    }

    #[test]
    fn test_every_field_has_a_section() {
        let schema = IntakeSchema::client_intake();
        let per_section: usize = Section::all()
            .iter()
            .map(|s| schema.section_fields(*s).count())
            .sum();
        assert_eq!(per_section, schema.fields().count());
    }

    #[test]
    fn test_required_inventory() {
        let schema = IntakeSchema::client_intake();
        let required: Vec<&str> = schema
            .fields()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        assert_eq!(
            required,
            vec![
                "full_name",
                "dob",
                "ssn",
                "citizenship",
                "residential_address",
                "employment_status",
                "electronic_delivery_consent",
            ]
        );
    }
}

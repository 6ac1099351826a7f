//! Core data models for the intake pipeline
//!
//! This module contains the value types that flow between the validation
//! engine, the security module, and the document generator.

pub mod money;
pub mod record;

pub use money::{Money, MoneyParseError};
pub use record::{FieldValue, IntakeRecord, RecordField, ValidationResult, Violation, DATE_FORMAT};

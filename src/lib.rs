//! Magnus Intake - client intake pipeline for an advisory firm
//!
//! This library implements the three stages of the intake pipeline:
//! validation of raw client input against the intake schema, encrypted-at-rest
//! storage of the validated record, and generation of the intake report PDF.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `error`: Custom error types
//! - `models`: Core data models (field values, records, violations)
//! - `schema`: The intake form schema (fields, sections, rules)
//! - `validation`: Schema-driven validation engine (collects all violations)
//! - `crypto`: Key derivation and field-level AEAD encryption
//! - `sealed`: Encrypted record format, persistence, secure deletion
//! - `pdf`: Intake report generation with optional password protection
//! - `audit`: Append-only operation log
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use magnus_intake::schema::IntakeSchema;
//! use magnus_intake::validation::validate;
//!
//! let schema = IntakeSchema::client_intake();
//! let result = validate(&raw_input, &schema);
//! ```

pub mod audit;
pub mod cli;
pub mod crypto;
pub mod error;
pub mod models;
pub mod pdf;
pub mod schema;
pub mod sealed;
pub mod validation;

pub use error::{IntakeError, IntakeResult};

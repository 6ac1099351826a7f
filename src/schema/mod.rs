//! Static field schema for the client intake form
//!
//! The schema is the single source of truth for field names, types,
//! requiredness, sensitivity flags, validation rules, and report layout
//! order. It is built once at process start and passed by reference.

pub mod client_intake;
pub mod spec;

pub use spec::{CrossRule, FieldRule, FieldSpec, FieldType, IntakeSchema, Section};

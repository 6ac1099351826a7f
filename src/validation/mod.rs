//! Validation engine for raw intake form input
//!
//! Applies per-field presence/type/format checks followed by cross-field
//! rules, collecting every violation so the UI can report them in one pass.

pub mod engine;
pub mod rules;

pub use engine::{validate, validate_as_of, RawInput};

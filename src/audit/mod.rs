//! Append-only audit log of pipeline operations
//!
//! Records which operation ran against which file and whether it succeeded.
//! Entries never contain field values, secrets, or document passwords.

pub mod entry;
pub mod logger;

pub use entry::{AuditEntry, Operation, Outcome};
pub use logger::AuditLogger;

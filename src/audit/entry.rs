//! Audit entry data structures
//!
//! Every pipeline operation is recorded: what ran, against which file, and
//! whether it succeeded. Entries carry counts and paths only. Field values,
//! secrets, and document passwords never appear in the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline operations that are audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Raw input was checked against the schema
    Validated,
    /// A record was encrypted and stored
    Sealed,
    /// A stored record was decrypted
    Unsealed,
    /// A report document was generated
    Rendered,
    /// A stored record was securely deleted
    Shredded,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Validated => write!(f, "VALIDATED"),
            Operation::Sealed => write!(f, "SEALED"),
            Operation::Unsealed => write!(f, "UNSEALED"),
            Operation::Rendered => write!(f, "RENDERED"),
            Operation::Shredded => write!(f, "SHREDDED"),
        }
    }
}

/// Whether the operation completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => write!(f, "ok"),
            Outcome::Failure => write!(f, "FAILED"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    /// Which pipeline operation ran
    pub operation: Operation,

    /// Whether it completed
    pub outcome: Outcome,

    /// File the operation targeted, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Non-sensitive context (violation count, page count, error category)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditEntry {
    /// Record a successful operation
    pub fn success(operation: Operation, target: Option<String>, detail: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            outcome: Outcome::Success,
            target,
            detail,
        }
    }

    /// Record a failed operation
    ///
    /// `detail` should name the error category, not its contents.
    pub fn failure(operation: Operation, target: Option<String>, detail: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            outcome: Outcome::Failure,
            target,
            detail,
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.outcome
        );

        if let Some(target) = &self.target {
            output.push_str(&format!(" {}", target));
        }

        if let Some(detail) = &self.detail {
            output.push_str(&format!(" ({})", detail));
        }

        output
    }
}

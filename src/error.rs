//! Custom error types for the intake core
//!
//! This module defines the error hierarchy for the pipeline using thiserror
//! for ergonomic error definitions. Validation violations are deliberately
//! NOT represented here: they are returned as data inside a
//! [`ValidationResult`](crate::models::ValidationResult) so a caller can show
//! a complete error report in one pass.

use thiserror::Error;

/// The main error type for intake core operations
#[derive(Error, Debug)]
pub enum IntakeError {
    /// Wrong secret or corrupted/truncated blob: the authentication tag
    /// did not verify. Recoverable by re-prompting for the secret.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Persisted blob uses a schema version this build does not recognize
    #[error("Unsupported record schema version {found} (supported: {supported})")]
    SchemaVersion { found: u8, supported: u8 },

    /// Document rendering failed; no output file was produced
    #[error("Render error: {0}")]
    Render(String),

    /// Cryptographic setup errors (bad KDF parameters, cipher init)
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl IntakeError {
    /// Check if this is an authentication failure (wrong secret / tampered blob)
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Check if this is a schema version mismatch
    pub fn is_schema_version(&self) -> bool {
        matches!(self, Self::SchemaVersion { .. })
    }
}

impl From<std::io::Error> for IntakeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for intake core operations
pub type IntakeResult<T> = Result<T, IntakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IntakeError::Authentication("tag mismatch".into());
        assert_eq!(err.to_string(), "Authentication failed: tag mismatch");
    }

    #[test]
    fn test_schema_version_display() {
        let err = IntakeError::SchemaVersion {
            found: 9,
            supported: 1,
        };
        assert_eq!(
            err.to_string(),
            "Unsupported record schema version 9 (supported: 1)"
        );
        assert!(err.is_schema_version());
    }

    #[test]
    fn test_predicates() {
        assert!(IntakeError::Authentication("x".into()).is_authentication());
        assert!(!IntakeError::Render("x".into()).is_authentication());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: IntakeError = io_err.into();
        assert!(matches!(err, IntakeError::Io(_)));
    }
}

//! Secure memory handling for secrets
//!
//! Secrets (data-encryption secret, document password) live only for the
//! duration of a seal/unseal/render call. `SecureString` zeroes its buffer
//! on drop and redacts itself from Debug/Display output.

use std::fmt;
use std::ops::Deref;

use zeroize::Zeroizing;

/// A string whose contents are zeroed on drop
pub struct SecureString {
    inner: Zeroizing<String>,
}

impl SecureString {
    /// Wrap a secret string
    pub fn new(s: impl Into<String>) -> Self {
        Self {
            inner: Zeroizing::new(s.into()),
        }
    }

    /// Get the string contents
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Get the length in bytes
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl AsRef<str> for SecureString {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED {} bytes]", self.inner.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_and_access() {
        let s = SecureString::new("hunter2");
        assert_eq!(s.as_str(), "hunter2");
        assert_eq!(s.len(), 7);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_debug_redacts() {
        let s = SecureString::new("hunter2");
        let debug = format!("{:?}", s);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_display_redacts() {
        let s = SecureString::new("hunter2");
        let display = format!("{}", s);
        assert!(!display.contains("hunter2"));
        assert!(display.contains("REDACTED"));
    }

    #[test]
    fn test_from_conversions() {
        let a: SecureString = "x".into();
        let b: SecureString = String::from("x").into();
        assert_eq!(a.as_str(), b.as_str());
    }
}

//! Per-field format rules
//!
//! Each checker takes the raw (or coerced) value and returns either the
//! normalized value or a user-facing reason. Identifier fields (SSN, phone,
//! account numbers) are normalized to digit-only canonical form so a record
//! stores one representation regardless of how the client typed it.

use chrono::{Datelike, NaiveDate};

/// SSNs that pass the 9-digit check but are never issued
const INVALID_SSNS: &[&str] = &[
    "000000000",
    "111111111",
    "222222222",
    "333333333",
    "444444444",
    "555555555",
    "666666666",
    "777777777",
    "888888888",
    "999999999",
    "123456789",
];

/// Strip everything but ASCII digits
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate and normalize a Social Security Number
pub fn check_ssn(raw: &str) -> Result<String, String> {
    let digits = digits_only(raw);
    if digits.len() != 9 {
        return Err("SSN must be 9 digits".into());
    }
    if INVALID_SSNS.contains(&digits.as_str()) {
        return Err("Please enter a valid SSN".into());
    }
    Ok(digits)
}

/// Validate and normalize a US phone number
pub fn check_phone(raw: &str) -> Result<String, String> {
    let digits = digits_only(raw);
    if digits.len() != 10 {
        return Err("Phone number must be 10 digits".into());
    }
    Ok(digits)
}

/// Validate and normalize a fixed-width digit identifier
pub fn check_digits(raw: &str, width: usize) -> Result<String, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if cleaned.len() != width || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Must be exactly {} digits", width));
    }
    Ok(cleaned)
}

/// Validate email address shape
pub fn check_email(raw: &str) -> Result<(), String> {
    let err = || "Please enter a valid email address".to_string();

    let (local, domain) = raw.split_once('@').ok_or_else(err)?;
    if local.is_empty() || domain.contains('@') || raw.chars().any(char::is_whitespace) {
        return Err(err());
    }
    let (_, tld) = domain.rsplit_once('.').ok_or_else(err)?;
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(err());
    }
    if domain.starts_with('.') || domain.starts_with('-') || domain.contains("..") {
        return Err(err());
    }
    Ok(())
}

/// Check a date of birth against an age window
pub fn check_age(dob: NaiveDate, today: NaiveDate, min: u32, max: u32) -> Result<(), String> {
    if dob > today {
        return Err("Date cannot be in the future".into());
    }

    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    let age = age.max(0) as u32;

    if age < min {
        return Err(format!("Age must be at least {} years", min));
    }
    if age > max {
        return Err(format!("Age cannot exceed {} years", max));
    }
    Ok(())
}

//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point precision
//! issues. Form input arrives as free text ("$1,250,000" or "85000.50"), so
//! the parser strips currency formatting before converting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

/// Error produced when a string cannot be parsed as a monetary amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyParseError(pub String);

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid monetary amount: {}", self.0)
    }
}

impl std::error::Error for MoneyParseError {}

impl Money {
    /// Create a Money amount from cents
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parse a money amount from form input
    ///
    /// Accepts "$1,234.56", "1234.56", "1,234", "-500", "$85000".
    /// A lone "." or any stray character is rejected.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();

        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let s = s.strip_prefix('$').unwrap_or(s);

        // Commas are display formatting only
        let cleaned: String = s.chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return Err(MoneyParseError(s.to_string()));
        }

        let cents = match cleaned.split_once('.') {
            Some((dollars, frac)) => {
                if dollars.is_empty() && frac.is_empty() {
                    return Err(MoneyParseError(s.to_string()));
                }
                if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(MoneyParseError(s.to_string()));
                }
                let dollars: i64 = if dollars.is_empty() {
                    0
                } else {
                    dollars
                        .parse()
                        .map_err(|_| MoneyParseError(s.to_string()))?
                };
                let frac_cents: i64 = match frac.len() {
                    0 => 0,
                    1 => frac.parse::<i64>().map_err(|_| MoneyParseError(s.to_string()))? * 10,
                    _ => frac.parse().map_err(|_| MoneyParseError(s.to_string()))?,
                };
                dollars
                    .checked_mul(100)
                    .and_then(|d| d.checked_add(frac_cents))
                    .ok_or_else(|| MoneyParseError(s.to_string()))?
            }
            None => {
                let dollars: i64 = cleaned
                    .parse()
                    .map_err(|_| MoneyParseError(s.to_string()))?;
                dollars
                    .checked_mul(100)
                    .ok_or_else(|| MoneyParseError(s.to_string()))?
            }
        };

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Money {
    /// Format as "$1,234.56" (grouping the dollar portion by thousands)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let dollars = abs / 100;
        let cents = abs % 100;

        let digits = dollars.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        if self.0 < 0 {
            write!(f, "-${}.{:02}", grouped, cents)
        } else {
            write!(f, "${}.{:02}", grouped, cents)
        }
    }
}

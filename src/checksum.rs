//! Checksum validation for number-like identifiers.

use crate::{Error, Result};

/// Luhn check over the decimal digits of `number`.
///
/// Non-digit characters are ignored, so separators need not be stripped
/// first. A string without digits sums to zero and therefore passes; callers
/// only run this on pattern matches that already contain 15-16 digits.
#[must_use]
pub fn is_luhn_valid(number: &str) -> bool {
    let sum: u32 = number
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                doubled / 10 + doubled % 10
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Luhn check for user-supplied input.
///
/// Unlike [`is_luhn_valid`], the input must consist of digits and the
/// separators the card pattern allows, with at least one digit.
///
/// # Errors
///
/// [`Error::InvalidInput`] if `number` has no digits or contains any other
/// character.
pub fn luhn_check(number: &str) -> Result<bool> {
    let digits = strip_separators(number);
    if digits.is_empty() {
        return Err(Error::invalid_input(format!("{number:?} contains no digits")));
    }
    if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(Error::invalid_input(format!("{number:?} contains non-digit {c:?}")));
    }
    Ok(is_luhn_valid(&digits))
}

/// Remove the separators the card pattern allows (`-` and space).
#[must_use]
pub fn strip_separators(number: &str) -> String {
    number.chars().filter(|c| *c != '-' && *c != ' ').collect()
}

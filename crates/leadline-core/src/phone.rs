// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! E.164 phone number normalization.
//!
//! The normalized number is the customer's natural key, so every
//! representation of the same North American number must collapse to one
//! string: `(214) 555-0100`, `214.555.0100`, `1-214-555-0100` and
//! `+1 214 555 0100` all become `+12145550100`.

use crate::error::LeadlineError;

/// Shortest international number (country code + subscriber) we accept.
const MIN_INTERNATIONAL_DIGITS: usize = 8;

/// E.164 maximum.
const MAX_DIGITS: usize = 15;

/// Normalize a raw phone number to E.164.
///
/// Separators and letters are dropped. Ten digits are treated as a NANP
/// number and get `+1`; eleven digits starting with `1` get `+`. Numbers
/// written with a leading `+`, or with 11 to 15 digits, keep their digits
/// as the country code and subscriber number.
pub fn normalize_phone(raw: &str) -> Result<String, LeadlineError> {
    let trimmed = raw.trim();
    let explicit_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    let normalized = match digits.len() {
        10 if !explicit_plus => format!("+1{digits}"),
        n if explicit_plus && (MIN_INTERNATIONAL_DIGITS..=MAX_DIGITS).contains(&n) => {
            format!("+{digits}")
        }
        n if (11..=MAX_DIGITS).contains(&n) => format!("+{digits}"),
        _ => {
            return Err(LeadlineError::Validation(format!(
                "`{raw}` is not a usable phone number"
            )));
        }
    };
    Ok(normalized)
}

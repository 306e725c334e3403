//! Decimal parsing shared by the filter and aggregate evaluators.
//!
//! Cells are opaque strings until a consumer asks for a number. Both `.` and
//! `,` are accepted as the decimal separator, and values are parsed into
//! arbitrary-precision [`BigDecimal`]s so comparisons and sums never pass
//! through binary floating point or lose digits.

use std::{borrow::Cow, str::FromStr};

use bigdecimal::BigDecimal;

/// Significant digits kept by a division result.
pub const DIVISION_PRECISION: u64 = 28;

/// Longest exponent accepted in scientific notation (`1e999999`).
const MAX_EXPONENT_DIGITS: usize = 6;

/// Parses `value` as a decimal number, returning `None` when it is not one.
pub fn parse_decimal(value: &str) -> Option<BigDecimal> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: Cow<'_, str> = if trimmed.contains(',') {
        Cow::Owned(trimmed.replace(',', "."))
    } else {
        Cow::Borrowed(trimmed)
    };
    if let Some((_, exponent)) = cleaned.split_once(['e', 'E']) {
        if exponent.trim_start_matches(['+', '-']).len() > MAX_EXPONENT_DIGITS {
            return None;
        }
    }
    BigDecimal::from_str(&cleaned).ok()
}

pub fn looks_numeric(value: &str) -> bool {
    parse_decimal(value).is_some()
}

/// Canonical text of a number: positional notation, scale preserved.
pub fn format_decimal(value: &BigDecimal) -> String {
    value.to_plain_string()
}

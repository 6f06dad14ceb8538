//! Normalization of user-typed amounts, applied once at the data-entry boundary.
//!
//! Grammar: optional currency symbol or code, optional `.` thousands separators
//! (groups of three digits), optional `,` followed by decimal digits. Whitespace is
//! ignored anywhere. Examples: `R$ 1.234,56`, `$ 99`, `12,5`.

use crate::CoreError;

pub fn parse_amount(input: &str) -> Result<f64, CoreError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let body = compact
        .trim_start_matches(|c: char| !(c.is_ascii_digit() || matches!(c, ',' | '.' | '-')));
    if body.is_empty() {
        return Err(invalid(input, "no digits"));
    }
    if body.starts_with('-') {
        return Err(invalid(input, "amount must not be negative"));
    }

    let (integer, fraction) = match body.split_once(',') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (body, None),
    };

    let mut groups = integer.split('.');
    let head = groups.next().unwrap_or_default();
    let tail: Vec<&str> = groups.collect();
    let head_ok = head.chars().all(|c| c.is_ascii_digit())
        && (tail.is_empty() || (1..=3).contains(&head.len()));
    let tail_ok = tail
        .iter()
        .all(|group| group.len() == 3 && group.chars().all(|c| c.is_ascii_digit()));
    if !head_ok || !tail_ok {
        return Err(invalid(input, "unexpected characters or digit grouping"));
    }

    let mut digits: String = integer.chars().filter(|c| *c != '.').collect();
    if digits.is_empty() {
        digits.push('0');
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid(input, "decimal part must be digits"));
        }
        digits.push('.');
        digits.push_str(fraction);
    }

    digits
        .parse::<f64>()
        .map_err(|_| invalid(input, "not a number"))
}

/// Integer form field with a fallback for blank, unparseable or zero input.
pub(crate) fn parse_count(input: &str, fallback: i64) -> i64 {
    match input.trim().parse::<i64>() {
        Ok(0) | Err(_) => fallback,
        Ok(value) => value,
    }
}

fn invalid(input: &str, reason: &str) -> CoreError {
    CoreError::Validation(format!("invalid amount `{}`: {}", input.trim(), reason))
}

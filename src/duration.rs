//! Parsing of Go-style duration strings such as `5s`, `1m30s` or `1.5h`.
//!
//! These strings are the serialized form of grace periods in plugin config,
//! so the accepted syntax must stay compatible with existing config files.

use std::time::Duration;
use thiserror::Error;

/// Reasons a duration string can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("negative durations are not supported")]
    Negative,
    #[error("missing unit in duration")]
    MissingUnit,
    #[error("unknown unit {0:?} in duration")]
    UnknownUnit(String),
    #[error("invalid number in duration")]
    InvalidNumber,
    #[error("duration out of range")]
    Overflow,
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3_600 * 1_000_000_000),
        _ => None,
    }
}

/// Parse a duration string like `300ms`, `+1.5h` or `2h45m`.
///
/// A leading `-` is accepted only when the remaining value is zero.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let (negative, rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    let duration = parse_unsigned(rest)?;
    if negative && !duration.is_zero() {
        return Err(DurationError::Negative);
    }
    Ok(duration)
}

fn parse_unsigned(mut rest: &str) -> Result<Duration, DurationError> {
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationError::Empty);
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." {
            return Err(DurationError::InvalidNumber);
        }

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit);
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit(unit.to_string()))?;

        let (whole, frac) = match number.split_once('.') {
            Some((w, f)) => (w, f),
            None => (number, ""),
        };
        if frac.contains('.') {
            return Err(DurationError::InvalidNumber);
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| DurationError::Overflow)?
        };
        let mut nanos = whole.checked_mul(scale).ok_or(DurationError::Overflow)?;
        if !frac.is_empty() {
            // Digits past nanosecond precision cannot contribute.
            let digits = &frac[..frac.len().min(18)];
            let frac_value: u128 = digits.parse().map_err(|_| DurationError::InvalidNumber)?;
            let denom = 10u128.pow(digits.len() as u32);
            nanos += frac_value * scale / denom;
        }
        total = total.checked_add(nanos).ok_or(DurationError::Overflow)?;
        rest = tail;
    }

    let secs = u64::try_from(total / 1_000_000_000).map_err(|_| DurationError::Overflow)?;
    Ok(Duration::new(secs, (total % 1_000_000_000) as u32))
}

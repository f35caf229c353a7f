//! String parsers shared by the built-in [`EnvValue`](crate::EnvValue) impls and
//! the default converter registry.

use crate::error::ParseError;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Parse a boolean literal: `1 t T TRUE true True` or `0 f F FALSE false False`
pub fn parse_bool(raw: &str) -> Result<bool, ParseError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseError::Bool(raw.to_string())),
    }
}

/// Split an integer literal into sign, digits and radix.
///
/// `0x`, `0o` and `0b` select base 16, 8 and 2, anything else is decimal.
pub fn split_radix(raw: &str) -> (&'static str, &str, u32) {
    let (sign, rest) = match raw.as_bytes().first() {
        Some(b'-') => ("-", &raw[1..]),
        Some(b'+') => ("", &raw[1..]),
        _ => ("", raw),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        Some("0o" | "0O") => (8, &rest[2..]),
        Some("0b" | "0B") => (2, &rest[2..]),
        _ => (10, rest),
    };
    (sign, digits, radix)
}

/// Parse a duration such as `300ms`, `1.5h` or `2h45m`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0` is
/// accepted without a unit. Negative durations are rejected.
pub fn parse_duration(raw: &str) -> Result<Duration, ParseError> {
    let invalid = |reason: &str| ParseError::invalid(raw, reason);

    let mut rest = raw.strip_prefix('+').unwrap_or(raw);
    if rest.starts_with('-') {
        return Err(invalid("negative durations are not supported"));
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid("invalid duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (int_part, after) = rest.split_at(int_end);
        let (frac_part, after) = match after.strip_prefix('.') {
            Some(after) => {
                let frac_end = after
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after.len());
                after.split_at(frac_end)
            }
            None => ("", after),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("invalid duration"));
        }

        let unit_end = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_end);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            "" => return Err(invalid("missing unit in duration")),
            _ => return Err(invalid(&format!("unknown unit {unit:?} in duration"))),
        };

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| invalid("duration out of range"))?
        };
        let mut nanos = whole
            .checked_mul(scale)
            .ok_or_else(|| invalid("duration out of range"))?;
        let mut frac_scale = scale;
        for digit in frac_part.bytes() {
            frac_scale /= 10;
            if frac_scale == 0 {
                break;
            }
            nanos = nanos
                .checked_add(u128::from(digit - b'0') * frac_scale)
                .ok_or_else(|| invalid("duration out of range"))?;
        }

        total = total
            .checked_add(nanos)
            .ok_or_else(|| invalid("duration out of range"))?;
        rest = after;
    }

    let nanos = u64::try_from(total).map_err(|_| invalid("duration out of range"))?;
    Ok(Duration::from_nanos(nanos))
}

/// Parse an RFC 3339 timestamp with optional fractional seconds, normalised to UTC
///
/// Date and time must be separated by an uppercase `T`, and UTC must be written
/// as an uppercase `Z`.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    if raw.as_bytes().get(10) != Some(&b'T') || raw.ends_with('z') {
        return Err(ParseError::invalid(
            raw,
            "expected RFC 3339 timestamp like 2006-01-02T15:04:05Z",
        ));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| ParseError::Time {
            value: raw.to_string(),
            source,
        })
}

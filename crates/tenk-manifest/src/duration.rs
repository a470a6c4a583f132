//! Go-style duration literals for cache-TTL directives.
//!
//! The Puppetfile dialect inherited duration syntax of the form `50m`,
//! `300ms`, `1.5h`, or concatenated segments like `2h45m`. Each segment is a
//! decimal number (fractions allowed) followed by a unit suffix.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("empty duration literal")]
    Empty,
    #[error("duration literal '{0}' is missing a unit")]
    MissingUnit(String),
    #[error("unknown time unit '{unit}' in duration literal '{literal}'")]
    UnknownUnit { literal: String, unit: String },
    #[error("invalid numeric value in duration literal '{0}'")]
    InvalidNumber(String),
}

/// Parse a duration literal such as `50m`, `300ms`, `1.5h`, or `2h45m`.
///
/// Segments accumulate: `2h45m` is two hours plus forty-five minutes.
/// Supported units are `ns`, `us`, `ms`, `s`, `m`, and `h`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let literal = input.trim();
    if literal.is_empty() {
        return Err(DurationError::Empty);
    }

    let mut rest = literal;
    let mut total_nanos = 0.0_f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number
            .parse()
            .map_err(|_| DurationError::InvalidNumber(literal.to_owned()))?;

        let unit_len = tail
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(tail.len());
        let (unit, remainder) = tail.split_at(unit_len);
        let per_unit_nanos = match unit {
            "ns" => 1.0,
            "us" => 1_000.0,
            "ms" => 1_000_000.0,
            "s" => 1_000_000_000.0,
            "m" => 60.0 * 1_000_000_000.0,
            "h" => 3600.0 * 1_000_000_000.0,
            "" => return Err(DurationError::MissingUnit(literal.to_owned())),
            other => {
                return Err(DurationError::UnknownUnit {
                    literal: literal.to_owned(),
                    unit: other.to_owned(),
                })
            }
        };
        total_nanos += value * per_unit_nanos;
        rest = remainder;
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

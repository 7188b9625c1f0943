//! Human-readable durations.
//!
//! Grammar: an optional sign followed by one or more `<decimal><unit>` pairs,
//! e.g. `300ms`, `1.5h`, `2h45m`. Units are `ns`, `us` (also `µs`/`μs`), `ms`,
//! `s`, `m` and `h`. The bare literal `0` is accepted without a unit.
//! Negative results are rejected since `std::time::Duration` is unsigned.

use std::time::Duration;

use crate::DurationError;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Split the leading run of ASCII digits off `s`.
fn leading_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Parse a duration string such as `"10s"` or `"2h30m"`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());

    let mut s = input;
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        let (whole, rest) = leading_digits(s);
        s = rest;

        // Fraction digits past u64 precision are dropped, not rejected.
        let mut fraction: u64 = 0;
        let mut scale: f64 = 1.0;
        let mut has_fraction = false;
        if let Some(rest) = s.strip_prefix('.') {
            let (digits, rest) = leading_digits(rest);
            s = rest;
            has_fraction = !digits.is_empty();
            for d in digits.bytes() {
                let Some(next) = fraction
                    .checked_mul(10)
                    .and_then(|f| f.checked_add(u64::from(d - b'0')))
                else {
                    break;
                };
                fraction = next;
                scale *= 10.0;
            }
        }

        if whole.is_empty() && !has_fraction {
            return Err(invalid());
        }

        let unit_end = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        let (unit, rest) = s.split_at(unit_end);
        s = rest;
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let per_unit = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut nanos = whole.checked_mul(per_unit).ok_or_else(invalid)?;
        if fraction > 0 {
            let extra = (fraction as f64 * (per_unit as f64 / scale)) as u64;
            nanos = nanos.checked_add(extra).ok_or_else(invalid)?;
        }
        total = total.checked_add(nanos).ok_or_else(invalid)?;
    }

    if negative && total > 0 {
        return Err(DurationError::Negative(input.to_string()));
    }
    Ok(Duration::from_nanos(total))
}

/// Render `value / 10^precision` with trailing fractional zeros trimmed.
fn fixed_point(value: u128, precision: u32) -> String {
    let divisor = 10u128.pow(precision);
    let whole = value / divisor;
    let fraction = value % divisor;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", fraction, width = precision as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Format a duration in the grammar accepted by [`parse_duration`].
///
/// Values of a second or more use the `XhYmZs` composition (`1h0m0s`,
/// `1m30s`, `1.5s`); shorter values use a single unit (`500ms`, `10ns`).
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    let micro = u128::from(MICROSECOND);
    let milli = u128::from(MILLISECOND);
    let second = u128::from(SECOND);
    if nanos < micro {
        return format!("{}ns", nanos);
    }
    if nanos < milli {
        return format!("{}\u{00b5}s", fixed_point(nanos, 3));
    }
    if nanos < second {
        return format!("{}ms", fixed_point(nanos, 6));
    }

    let total_secs = nanos / second;
    let secs = fixed_point((total_secs % 60) * second + nanos % second, 9);
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Serde adapter for `Duration` fields.
///
/// Serializes as a duration string. Deserializes from either a duration
/// string or an integer count of nanoseconds.
pub mod serde_duration {
    use std::fmt;
    use std::time::Duration;

    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*value))
    }

    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a duration string or a non-negative count of nanoseconds")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_nanos(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_nanos)
                .map_err(|_| E::custom(format!("negative duration: {}", v)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Duration, E> {
            if v.is_finite() && v >= 0.0 && v < u64::MAX as f64 {
                Ok(Duration::from_nanos(v as u64))
            } else {
                Err(E::custom(format!("invalid duration: {}", v)))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            super::parse_duration(v).map_err(E::custom)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        deserializer.deserialize_any(DurationVisitor)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Formatting then parsing gives back the same duration.
        #[test]
        fn prop_format_parse_roundtrip(nanos in any::<u64>()) {
            let d = Duration::from_nanos(nanos);
            let text = format_duration(d);
            prop_assert_eq!(parse_duration(&text).unwrap(), d, "formatted as {}", text);
        }

        /// Parsing never panics, whatever the input.
        #[test]
        fn prop_parse_total(s in ".*") {
            let _ = parse_duration(&s);
        }
    }
}

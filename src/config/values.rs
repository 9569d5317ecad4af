//! Typed Value Parsing
//!
//! Configuration sources hand back raw strings; every typed read in the
//! assembly pipeline goes through one of these parsers. A present value
//! that fails to parse is always an error surfaced with the offending key,
//! the raw value, and the expected type. Absent values are the caller's
//! responsibility: each call site applies its own default policy, the
//! parsers never invent defaults.
//!
//! Parsing policies, documented and tested:
//! - booleans: `true`/`false`, ASCII case-insensitive, surrounding
//!   whitespace ignored
//! - integers: non-negative decimal
//! - durations: timespan form `[days.]hours:minutes:seconds[.fraction]`,
//!   with `hours:minutes` accepted; hours < 24, minutes and seconds < 60
//! - enumerations: case-sensitive exact match, delegated to the enum's
//!   `FromStr`

use std::str::FromStr;
use std::time::Duration;

use super::error::{ConfigResult, ConfigurationError};

const NANOS_PER_SECOND_DIGITS: usize = 9;

/// Parse a boolean value
pub fn parse_bool(raw: &str, key: &str) -> ConfigResult<bool> {
    match raw.trim() {
        t if t.eq_ignore_ascii_case("true") => Ok(true),
        f if f.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(ConfigurationError::invalid_value(key, raw, "boolean")),
    }
}

/// Parse a non-negative integer value
pub fn parse_u32(raw: &str, key: &str) -> ConfigResult<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ConfigurationError::invalid_value(key, raw, "non-negative integer"))
}

/// Parse a duration in timespan form: `[days.]hours:minutes:seconds[.fraction]`
pub fn parse_duration(raw: &str, key: &str) -> ConfigResult<Duration> {
    parse_timespan(raw.trim()).ok_or_else(|| {
        ConfigurationError::invalid_value(
            key,
            raw,
            "duration in [days.]hours:minutes:seconds[.fraction] form",
        )
    })
}

/// Parse an enumeration value through its `FromStr` implementation.
///
/// Matching is as strict as the target type's `FromStr`; the enums in this
/// crate all match case-sensitively.
pub fn parse_enum<T: FromStr>(raw: &str, key: &str) -> ConfigResult<T> {
    T::from_str(raw.trim())
        .map_err(|_| ConfigurationError::invalid_value(key, raw, short_type_name::<T>()))
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

fn parse_timespan(s: &str) -> Option<Duration> {
    if s.is_empty() {
        return None;
    }

    // An all-digit prefix before a '.' is a day count, provided the rest is
    // still a clock component ("1.02:03:04"); otherwise the '.' belongs to a
    // seconds fraction and is handled below.
    let (days, clock) = match s.split_once('.') {
        Some((prefix, rest))
            if !prefix.is_empty()
                && prefix.chars().all(|c| c.is_ascii_digit())
                && rest.contains(':') =>
        {
            (prefix.parse::<u64>().ok()?, rest)
        }
        _ => (0, s),
    };

    let mut parts = clock.split(':');
    let hours = parse_component(parts.next()?, 24)?;
    let minutes = parse_component(parts.next()?, 60)?;
    let (seconds, nanos) = match parts.next() {
        Some(seconds_part) => parse_seconds(seconds_part)?,
        None => (0, 0),
    };
    if parts.next().is_some() {
        return None;
    }

    let total_seconds = days
        .checked_mul(86_400)?
        .checked_add(hours * 3_600 + minutes * 60 + seconds)?;
    Some(Duration::new(total_seconds, nanos))
}

fn parse_component(part: &str, limit: u64) -> Option<u64> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value = part.parse::<u64>().ok()?;
    (value < limit).then_some(value)
}

fn parse_seconds(part: &str) -> Option<(u64, u32)> {
    let (whole, fraction) = match part.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (part, None),
    };

    let seconds = parse_component(whole, 60)?;
    let nanos = match fraction {
        Some(digits)
            if !digits.is_empty()
                && digits.len() <= NANOS_PER_SECOND_DIGITS
                && digits.chars().all(|c| c.is_ascii_digit()) =>
        {
            let value = digits.parse::<u32>().ok()?;
            value * 10u32.pow((NANOS_PER_SECOND_DIGITS - digits.len()) as u32)
        }
        Some(_) => return None,
        None => 0,
    };

    Some((seconds, nanos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn booleans_parse_case_insensitively() {
        assert!(parse_bool("true", "K").unwrap());
        assert!(parse_bool("True", "K").unwrap());
        assert!(!parse_bool("False", "K").unwrap());
        assert!(!parse_bool(" false ", "K").unwrap());
    }

    #[test]
    fn unparsable_boolean_reports_key_and_value() {
        let error = parse_bool("cannot be parsed to a bool", "SendOnly").unwrap_err();
        let message = error.to_string();
        assert!(message.contains("'SendOnly'"));
        assert!(message.contains("cannot be parsed to a bool"));
    }

    #[test]
    fn integers_parse_decimal_values() {
        assert_eq!(parse_u32("14", "K").unwrap(), 14);
        assert_eq!(parse_u32(" 0 ", "K").unwrap(), 0);
        assert!(parse_u32("-3", "K").is_err());
        assert!(parse_u32("cannot be parsed", "K").is_err());
    }

    #[test]
    fn durations_parse_timespan_forms() {
        assert_eq!(
            parse_duration("00:00:14", "K").unwrap(),
            Duration::from_secs(14)
        );
        assert_eq!(
            parse_duration("01:30", "K").unwrap(),
            Duration::from_secs(90 * 60)
        );
        assert_eq!(
            parse_duration("1.02:03:04", "K").unwrap(),
            Duration::from_secs(86_400 + 2 * 3_600 + 3 * 60 + 4)
        );
        assert_eq!(
            parse_duration("00:00:01.5", "K").unwrap(),
            Duration::new(1, 500_000_000)
        );
    }

    #[test]
    fn durations_reject_out_of_range_components() {
        assert!(parse_duration("24:00:00", "K").is_err());
        assert!(parse_duration("00:61:00", "K").is_err());
        assert!(parse_duration("00:00:61", "K").is_err());
        assert!(parse_duration("14", "K").is_err());
        assert!(parse_duration("cannot be parsed", "K").is_err());
        assert!(parse_duration("", "K").is_err());
    }

    #[test]
    fn enum_parsing_is_case_sensitive() {
        use crate::endpoint::TransactionMode;

        let mode: TransactionMode = parse_enum("ReceiveOnly", "K").unwrap();
        assert_eq!(mode, TransactionMode::ReceiveOnly);

        let error = parse_enum::<TransactionMode>("receiveonly", "K").unwrap_err();
        assert!(error.to_string().contains("TransactionMode"));
    }

    proptest! {
        #[test]
        fn duration_parser_never_panics(raw in ".*") {
            let _ = parse_duration(&raw, "K");
        }

        #[test]
        fn well_formed_timespans_parse_exactly(
            days in 0u64..30,
            hours in 0u64..24,
            minutes in 0u64..60,
            seconds in 0u64..60,
        ) {
            let raw = format!("{days}.{hours:02}:{minutes:02}:{seconds:02}");
            let expected = days * 86_400 + hours * 3_600 + minutes * 60 + seconds;
            prop_assert_eq!(
                parse_duration(&raw, "K").unwrap(),
                Duration::from_secs(expected)
            );
        }
    }
}

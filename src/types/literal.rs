//! Literal formatting helpers
//!
//! Rendering rules shared by [`Value`](super::Value) and the parameter
//! declarations: string quoting, scientific-notation reals and RFC 3339
//! timestamps with nanosecond precision.

use chrono::{DateTime, FixedOffset};
use std::fmt::Write;

/// Quote `value` as a string literal, escaping anything the parser would choke on.
///
/// `hidden` prefixes the literal with `h`, marking it as obfuscated in logs.
/// An empty input is returned unchanged, not as `""`.
pub fn quote_string(value: &str, hidden: bool) -> String {
    if value.is_empty() {
        return String::new();
    }

    let mut literal = String::with_capacity(value.len() + 3);
    if hidden {
        literal.push('h');
    }
    literal.push('"');

    for c in value.chars() {
        match c {
            '\'' => literal.push_str("\\'"),
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\0' => literal.push_str("\\0"),
            '\u{07}' => literal.push_str("\\a"),
            '\u{08}' => literal.push_str("\\b"),
            '\u{0C}' => literal.push_str("\\f"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            '\u{0B}' => literal.push_str("\\v"),
            c if should_be_escaped(c) => {
                let _ = write!(literal, "\\u{:04x}", c as u32);
            }
            c => literal.push(c),
        }
    }

    literal.push('"');
    literal
}

/// Control characters in the Latin-1 range and anything beyond Latin-1
pub fn should_be_escaped(c: char) -> bool {
    if (c as u32) <= 0xFF {
        return c.is_control();
    }
    true
}

/// Scientific notation with the shortest mantissa that round-trips, e.g. `1.5e+00`
pub fn format_real(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }

    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

/// RFC 3339 with up to nine fractional digits, trailing zeros dropped, `Z` for UTC
pub fn format_datetime(value: &DateTime<FixedOffset>) -> String {
    let mut out = value.format("%Y-%m-%dT%H:%M:%S").to_string();

    let nanos = value.timestamp_subsec_nanos() % 1_000_000_000;
    if nanos > 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }

    if value.offset().local_minus_utc() == 0 {
        out.push('Z');
    } else {
        out.push_str(&value.format("%:z").to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_quote_empty_is_unchanged() {
        assert_eq!(quote_string("", false), "");
        assert_eq!(quote_string("", true), "");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote_string("a\"b", false), r#""a\"b""#);
        assert_eq!(quote_string("it's", false), r#""it\'s""#);
        assert_eq!(quote_string("a\tb", false), r#""a\tb""#);
        assert_eq!(quote_string("c:\\temp", false), r#""c:\\temp""#);
        assert_eq!(quote_string("nul\0", false), r#""nul\0""#);
        assert_eq!(quote_string("\u{07}\u{08}\u{0C}\n\r\u{0B}", false), r#""\a\b\f\n\r\v""#);
    }

    #[test]
    fn test_quote_hidden_prefix() {
        assert_eq!(quote_string("secret", true), "h\"secret\"");
    }

    #[test]
    fn test_quote_unicode_escapes() {
        // Latin-1 printable characters pass through
        assert_eq!(quote_string("café", false), "\"café\"");
        // C1 control character
        assert_eq!(quote_string("\u{85}", false), r#""\u0085""#);
        assert_eq!(quote_string("\u{1b}", false), r#""\u001b""#);
        // Beyond Latin-1
        assert_eq!(quote_string("€", false), r#""\u20ac""#);
        assert_eq!(quote_string("日本", false), r#""\u65e5\u672c""#);
    }

    #[test]
    fn test_should_be_escaped() {
        assert!(!should_be_escaped('a'));
        assert!(!should_be_escaped('ÿ'));
        assert!(should_be_escaped('\u{7f}'));
        assert!(should_be_escaped('Ā'));
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(1.5), "1.5e+00");
        assert_eq!(format_real(100.0), "1e+02");
        assert_eq!(format_real(0.001), "1e-03");
        assert_eq!(format_real(-123.456), "-1.23456e+02");
        assert_eq!(format_real(0.0), "0e+00");
        assert_eq!(format_real(1e300), "1e+300");
        assert_eq!(format_real(f64::NAN), "NaN");
        assert_eq!(format_real(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn test_format_datetime() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let dt = utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(format_datetime(&dt), "2024-03-01T12:30:00Z");

        let with_nanos = dt + chrono::TimeDelta::nanoseconds(120_000_000);
        assert_eq!(format_datetime(&with_nanos), "2024-03-01T12:30:00.12Z");

        let with_all = dt + chrono::TimeDelta::nanoseconds(1);
        assert_eq!(format_datetime(&with_all), "2024-03-01T12:30:00.000000001Z");

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = plus_two.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
        assert_eq!(format_datetime(&local), "2024-03-01T14:30:00+02:00");
    }
}

//! Timespan literal formatting
//!
//! Timespans are written as `[-][d.]hh:mm:ss[.fffffff]`, where the fraction is
//! three millisecond digits followed by the remaining 100ns ticks.

use chrono::TimeDelta;
use std::fmt::Write;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_TICK: i64 = 100;

/// Render a timespan in literal form. `None` (an unset value) renders as `00:00:00`.
pub fn marshal(span: Option<&TimeDelta>) -> String {
    let Some(span) = span else {
        return "00:00:00".to_string();
    };

    let mut out = String::new();

    let magnitude = if *span < TimeDelta::zero() {
        out.push('-');
        span.abs()
    } else {
        *span
    };

    let mut seconds = magnitude.num_seconds();
    let mut nanos = magnitude.subsec_nanos() as i64;

    let days = seconds / SECONDS_PER_DAY;
    seconds -= days * SECONDS_PER_DAY;
    if days > 0 {
        let _ = write!(out, "{}.", days);
    }

    let hours = seconds / 3600;
    seconds -= hours * 3600;
    let minutes = seconds / 60;
    seconds -= minutes * 60;
    let _ = write!(out, "{:02}:{:02}:{:02}", hours, minutes, seconds);

    let millis = nanos / NANOS_PER_MILLI;
    nanos -= millis * NANOS_PER_MILLI;
    let ticks = nanos / NANOS_PER_TICK;
    if millis > 0 || ticks > 0 {
        let fraction = format!("{:03}{:04}", millis, ticks);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }

    out
}

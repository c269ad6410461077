//! Typed scalar values
//!
//! A [`Value`] is one of the ten scalar kinds together with its native Rust
//! representation. `None` means the value is unset (null), which renders as an
//! empty string through [`Display`](std::fmt::Display) regardless of kind.

use super::literal::{format_datetime, format_real, quote_string};
use super::{ValueKind, timespan};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(Option<bool>),
    DateTime(Option<DateTime<FixedOffset>>),
    /// Raw JSON text, not re-validated
    Dynamic(Option<Vec<u8>>),
    Guid(Option<Uuid>),
    Int(Option<i32>),
    Long(Option<i64>),
    Real(Option<f64>),
    String(Option<String>),
    Timespan(Option<TimeDelta>),
    /// Numeric literal text, e.g. `"123.45"`
    Decimal(Option<String>),
}

impl Value {
    /// An unset value of the given kind
    pub fn null(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => Value::Bool(None),
            ValueKind::DateTime => Value::DateTime(None),
            ValueKind::Dynamic => Value::Dynamic(None),
            ValueKind::Guid => Value::Guid(None),
            ValueKind::Int => Value::Int(None),
            ValueKind::Long => Value::Long(None),
            ValueKind::Real => Value::Real(None),
            ValueKind::String => Value::String(None),
            ValueKind::Timespan => Value::Timespan(None),
            ValueKind::Decimal => Value::Decimal(None),
        }
    }

    pub fn dynamic(raw: impl Into<Vec<u8>>) -> Self {
        Value::Dynamic(Some(raw.into()))
    }

    pub fn decimal(literal: impl Into<String>) -> Self {
        Value::Decimal(Some(literal.into()))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Dynamic(_) => ValueKind::Dynamic,
            Value::Guid(_) => ValueKind::Guid,
            Value::Int(_) => ValueKind::Int,
            Value::Long(_) => ValueKind::Long,
            Value::Real(_) => ValueKind::Real,
            Value::String(_) => ValueKind::String,
            Value::Timespan(_) => ValueKind::Timespan,
            Value::Decimal(_) => ValueKind::Decimal,
        }
    }

    /// Whether the value was set
    pub fn is_valid(&self) -> bool {
        match self {
            Value::Bool(v) => v.is_some(),
            Value::DateTime(v) => v.is_some(),
            Value::Dynamic(v) => v.is_some(),
            Value::Guid(v) => v.is_some(),
            Value::Int(v) => v.is_some(),
            Value::Long(v) => v.is_some(),
            Value::Real(v) => v.is_some(),
            Value::String(v) => v.is_some(),
            Value::Timespan(v) => v.is_some(),
            Value::Decimal(v) => v.is_some(),
        }
    }

    /// Timespan literal form. Only meaningful for `Timespan`; an unset
    /// timespan yields `00:00:00`.
    pub fn marshal_timespan(&self) -> Option<String> {
        match self {
            Value::Timespan(span) => Some(timespan::marshal(span.as_ref())),
            _ => None,
        }
    }

    /// Literal suitable for embedding in query text, e.g. `int(5)` or `"text"`.
    ///
    /// Unset values become `<kind>(null)`; an unset string becomes `""`.
    pub fn to_literal(&self) -> String {
        match self {
            Value::String(Some(s)) if s.is_empty() => "\"\"".to_string(),
            Value::String(Some(s)) => quote_string(s, false),
            Value::String(None) => "\"\"".to_string(),
            other if !other.is_valid() => format!("{}(null)", other.kind()),
            other => format!("{}({})", other.kind(), other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(Some(b)) => write!(f, "{}", b),
            Value::DateTime(Some(dt)) => f.write_str(&format_datetime(dt)),
            Value::Dynamic(Some(raw)) => f.write_str(&String::from_utf8_lossy(raw)),
            Value::Guid(Some(id)) => write!(f, "{}", id.hyphenated()),
            Value::Int(Some(i)) => write!(f, "{}", i),
            Value::Long(Some(l)) => write!(f, "{}", l),
            Value::Real(Some(r)) => f.write_str(&format_real(*r)),
            Value::String(Some(s)) => f.write_str(s),
            Value::Timespan(Some(span)) => f.write_str(&timespan::marshal(Some(span))),
            Value::Decimal(Some(d)) => f.write_str(d),
            _ => Ok(()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(Some(value))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::DateTime(Some(value))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(Some(value.fixed_offset()))
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Guid(Some(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(Some(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(Some(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(Some(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Some(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Some(value.to_string()))
    }
}

impl From<TimeDelta> for Value {
    fn from(value: TimeDelta) -> Self {
        Value::Timespan(Some(value))
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Dynamic(Some(value.to_string().into_bytes()))
    }
}

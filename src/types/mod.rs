//! Kusto scalar types
//!
//! The service knows a fixed set of ten scalar kinds. [`ValueKind`] names them,
//! [`Value`] carries a value of one of them, and the [`literal`] and
//! [`timespan`] modules render values into query-language text.

pub mod literal;
pub mod timespan;
pub mod value;

pub use literal::{quote_string, should_be_escaped};
pub use value::Value;

use crate::error::KustoError;
use std::fmt;
use std::str::FromStr;

/// The scalar kinds understood by the query language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    DateTime,
    Dynamic,
    Guid,
    Int,
    Long,
    Real,
    String,
    Timespan,
    Decimal,
}

impl ValueKind {
    pub const ALL: [ValueKind; 10] = [
        ValueKind::Bool,
        ValueKind::DateTime,
        ValueKind::Dynamic,
        ValueKind::Guid,
        ValueKind::Int,
        ValueKind::Long,
        ValueKind::Real,
        ValueKind::String,
        ValueKind::Timespan,
        ValueKind::Decimal,
    ];

    /// Keyword used for this kind in declarations and literals
    pub fn keyword(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::DateTime => "datetime",
            ValueKind::Dynamic => "dynamic",
            ValueKind::Guid => "guid",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Real => "real",
            ValueKind::String => "string",
            ValueKind::Timespan => "timespan",
            ValueKind::Decimal => "decimal",
        }
    }

    /// Whether `tag` names one of the ten kinds
    pub fn is_valid(tag: &str) -> bool {
        tag.parse::<ValueKind>().is_ok()
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ValueKind {
    type Err = KustoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.keyword() == s)
            .ok_or_else(|| KustoError::validation(format!("unknown value kind '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_keywords_round_trip() {
        for kind in ValueKind::ALL {
            assert_eq!(kind.keyword().parse::<ValueKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_validation_error() {
        let err = "boolean".parse::<ValueKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!ValueKind::is_valid("Int"));
        assert!(!ValueKind::is_valid(""));
        assert!(ValueKind::is_valid("timespan"));
    }
}

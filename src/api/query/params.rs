//! Query parameter declarations
//!
//! A [`ParamType`] declares one external parameter (`name:kind`, optionally
//! with a default). It is validated once when built, so rendering the
//! declaration clause can never fail. [`Definitions`] groups declarations into
//! the `declare query_parameters(...)` statement prefix and [`Parameters`]
//! binds concrete values to them.

use crate::error::{KustoError, Result};
use crate::types::literal::{format_datetime, format_real, quote_string};
use crate::types::{Value, ValueKind, timespan};
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Decimal numbers with or without a dot, either side of it optional
static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(([0-9]+\.?[0-9]*)|([0-9]*\.?[0-9]+))$").expect("valid decimal regex"));

/// Whether `literal` is a plain unsigned decimal number such as `12`, `1.5` or `.5`
pub fn is_decimal_literal(literal: &str) -> bool {
    DECIMAL_RE.is_match(literal)
}

/// Default for a decimal parameter
#[derive(Debug, Clone, PartialEq)]
pub enum DecimalDefault {
    /// Numeric text, must match the decimal pattern
    Literal(String),
    /// Arbitrary-precision number; `None` is rejected at validation
    Numeric(Option<BigDecimal>),
}

/// Native default value for a declared parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamDefault {
    Bool(bool),
    DateTime(DateTime<FixedOffset>),
    Dynamic(Vec<u8>),
    Guid(Uuid),
    Int(i32),
    Long(i64),
    Real(f64),
    String(String),
    Timespan(TimeDelta),
    Decimal(DecimalDefault),
}

impl ParamDefault {
    /// Kind of the native representation
    pub fn kind(&self) -> ValueKind {
        match self {
            ParamDefault::Bool(_) => ValueKind::Bool,
            ParamDefault::DateTime(_) => ValueKind::DateTime,
            ParamDefault::Dynamic(_) => ValueKind::Dynamic,
            ParamDefault::Guid(_) => ValueKind::Guid,
            ParamDefault::Int(_) => ValueKind::Int,
            ParamDefault::Long(_) => ValueKind::Long,
            ParamDefault::Real(_) => ValueKind::Real,
            ParamDefault::String(_) => ValueKind::String,
            ParamDefault::Timespan(_) => ValueKind::Timespan,
            ParamDefault::Decimal(_) => ValueKind::Decimal,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ParamDefault::Bool(_) => "bool",
            ParamDefault::DateTime(_) => "DateTime",
            ParamDefault::Dynamic(_) => "bytes",
            ParamDefault::Guid(_) => "Uuid",
            ParamDefault::Int(_) => "i32",
            ParamDefault::Long(_) => "i64",
            ParamDefault::Real(_) => "f64",
            ParamDefault::String(_) => "String",
            ParamDefault::Timespan(_) => "TimeDelta",
            ParamDefault::Decimal(DecimalDefault::Literal(_)) => "String",
            ParamDefault::Decimal(DecimalDefault::Numeric(_)) => "BigDecimal",
        }
    }
}

impl From<bool> for ParamDefault {
    fn from(value: bool) -> Self {
        ParamDefault::Bool(value)
    }
}

impl From<DateTime<FixedOffset>> for ParamDefault {
    fn from(value: DateTime<FixedOffset>) -> Self {
        ParamDefault::DateTime(value)
    }
}

impl From<DateTime<Utc>> for ParamDefault {
    fn from(value: DateTime<Utc>) -> Self {
        ParamDefault::DateTime(value.fixed_offset())
    }
}

impl From<Uuid> for ParamDefault {
    fn from(value: Uuid) -> Self {
        ParamDefault::Guid(value)
    }
}

impl From<i32> for ParamDefault {
    fn from(value: i32) -> Self {
        ParamDefault::Int(value)
    }
}

impl From<i64> for ParamDefault {
    fn from(value: i64) -> Self {
        ParamDefault::Long(value)
    }
}

impl From<f64> for ParamDefault {
    fn from(value: f64) -> Self {
        ParamDefault::Real(value)
    }
}

impl From<&str> for ParamDefault {
    fn from(value: &str) -> Self {
        ParamDefault::String(value.to_string())
    }
}

impl From<String> for ParamDefault {
    fn from(value: String) -> Self {
        ParamDefault::String(value)
    }
}

impl From<TimeDelta> for ParamDefault {
    fn from(value: TimeDelta) -> Self {
        ParamDefault::Timespan(value)
    }
}

impl From<DecimalDefault> for ParamDefault {
    fn from(value: DecimalDefault) -> Self {
        ParamDefault::Decimal(value)
    }
}

impl From<BigDecimal> for ParamDefault {
    fn from(value: BigDecimal) -> Self {
        ParamDefault::Decimal(DecimalDefault::Numeric(Some(value)))
    }
}

impl From<Option<BigDecimal>> for ParamDefault {
    fn from(value: Option<BigDecimal>) -> Self {
        ParamDefault::Decimal(DecimalDefault::Numeric(value))
    }
}

/// A validated parameter declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ParamType {
    name: String,
    kind: ValueKind,
    default: Option<ParamDefault>,
    default_literal: Option<String>,
}

impl ParamType {
    /// Declaration without a default, always valid for a non-empty name
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Result<Self> {
        Self::build(name.into(), kind, None)
    }

    /// Declaration with a default whose native type must match `kind`
    pub fn with_default(
        name: impl Into<String>,
        kind: ValueKind,
        default: impl Into<ParamDefault>,
    ) -> Result<Self> {
        Self::build(name.into(), kind, Some(default.into()))
    }

    /// Declaration from a textual kind tag such as `"long"`
    pub fn from_tag(name: impl Into<String>, tag: &str, default: Option<ParamDefault>) -> Result<Self> {
        let kind: ValueKind = tag.parse()?;
        Self::build(name.into(), kind, default)
    }

    fn build(name: String, kind: ValueKind, default: Option<ParamDefault>) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(KustoError::validation("parameter name cannot be empty"));
        }

        let default_literal = match &default {
            None => None,
            Some(value) => Some(default_literal(&name, kind, value)?),
        };

        Ok(Self {
            name,
            kind,
            default,
            default_literal,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn default(&self) -> Option<&ParamDefault> {
        self.default.as_ref()
    }

    /// `name:kind` or `name:kind = kind(default)`
    pub fn render(&self) -> String {
        match &self.default_literal {
            None => format!("{}:{}", self.name, self.kind),
            Some(literal) => format!("{}:{} = {}", self.name, self.kind, literal),
        }
    }
}

/// Check `default` against `kind` and produce its literal
fn default_literal(name: &str, kind: ValueKind, default: &ParamDefault) -> Result<String> {
    let mismatch = || {
        KustoError::validation(format!(
            "invalid type for parameter {}: expected {}, got {}",
            name,
            kind,
            default.type_name()
        ))
    };

    let literal = match (kind, default) {
        (ValueKind::Dynamic, _) => {
            return Err(KustoError::validation(format!(
                "invalid type for parameter {}: cannot set default value for dynamic type",
                name
            )));
        }
        (ValueKind::Bool, ParamDefault::Bool(b)) => format!("bool({})", b),
        (ValueKind::DateTime, ParamDefault::DateTime(dt)) => format!("datetime({})", format_datetime(dt)),
        (ValueKind::Guid, ParamDefault::Guid(id)) => format!("guid({})", id.hyphenated()),
        (ValueKind::Int, ParamDefault::Int(i)) => format!("int({})", i),
        (ValueKind::Long, ParamDefault::Long(l)) => format!("long({})", l),
        (ValueKind::Real, ParamDefault::Real(r)) => format!("real({})", format_real(*r)),
        (ValueKind::String, ParamDefault::String(s)) if s.is_empty() => "\"\"".to_string(),
        (ValueKind::String, ParamDefault::String(s)) => quote_string(s, false),
        (ValueKind::Timespan, ParamDefault::Timespan(span)) => {
            format!("timespan({})", timespan::marshal(Some(span)))
        }
        (ValueKind::Decimal, ParamDefault::Decimal(DecimalDefault::Literal(text))) => {
            if !is_decimal_literal(text) {
                return Err(KustoError::validation(format!(
                    "invalid type for parameter {}: string representing decimal does not appear to be a decimal number, was {}",
                    name, text
                )));
            }
            format!("decimal({})", text)
        }
        (ValueKind::Decimal, ParamDefault::Decimal(DecimalDefault::Numeric(Some(number)))) => {
            format!("decimal({})", number)
        }
        (ValueKind::Decimal, ParamDefault::Decimal(DecimalDefault::Numeric(None))) => {
            return Err(KustoError::validation(format!(
                "invalid type for parameter {}: BigDecimal default cannot be null",
                name
            )));
        }
        (ValueKind::Decimal, ParamDefault::String(text)) => {
            return default_literal(
                name,
                kind,
                &ParamDefault::Decimal(DecimalDefault::Literal(text.clone())),
            );
        }
        _ => return Err(mismatch()),
    };

    Ok(literal)
}

/// Ordered set of parameter declarations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    params: Vec<ParamType>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration; names must be unique
    pub fn add(mut self, param: ParamType) -> Result<Self> {
        if self.get(param.name()).is_some() {
            return Err(KustoError::validation(format!(
                "parameter {} is declared more than once",
                param.name()
            )));
        }
        self.params.push(param);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&ParamType> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamType> {
        self.params.iter()
    }

    /// `declare query_parameters(a:int, b:string = "x");`, or empty when nothing is declared
    pub fn to_declaration(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = self.params.iter().map(|p| p.render()).collect();
        format!("declare query_parameters({});", rendered.join(", "))
    }
}

/// Values bound to declared parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, Value>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Render every value as a literal, checking it against its declaration
    pub fn to_literals(&self, definitions: &Definitions) -> Result<BTreeMap<String, String>> {
        let mut literals = BTreeMap::new();
        for (name, value) in &self.values {
            let declared = definitions.get(name).ok_or_else(|| {
                KustoError::validation(format!("parameter {} is not declared", name))
            })?;

            if declared.kind() != value.kind() {
                return Err(KustoError::validation(format!(
                    "parameter {} is declared as {} but the value is {}",
                    name,
                    declared.kind(),
                    value.kind()
                )));
            }

            if let Value::Decimal(Some(text)) = value {
                if !is_decimal_literal(text) {
                    return Err(KustoError::validation(format!(
                        "parameter {}: {} is not a decimal number",
                        name, text
                    )));
                }
            }

            literals.insert(name.clone(), value.to_literal());
        }
        Ok(literals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn assert_validation<T: std::fmt::Debug>(result: Result<T>) {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_decimal_pattern() {
        for ok in ["123.45", "0", "12.", ".5", "007"] {
            assert!(is_decimal_literal(ok), "{} should match", ok);
        }
        for bad in ["12.34.56", "abc", "", ".", "-1", "1e5", " 1", "١٢"] {
            assert!(!is_decimal_literal(bad), "{} should not match", bad);
        }
    }

    #[test]
    fn test_no_default_always_valid() {
        for kind in ValueKind::ALL {
            let param = ParamType::new("p", kind).unwrap();
            assert_eq!(param.render(), format!("p:{}", kind.keyword()));
        }
    }

    #[test]
    fn test_defaults_render() {
        let cases = vec![
            (ParamType::with_default("b", ValueKind::Bool, true), "b:bool = bool(true)"),
            (ParamType::with_default("i", ValueKind::Int, 42i32), "i:int = int(42)"),
            (ParamType::with_default("l", ValueKind::Long, -7i64), "l:long = long(-7)"),
            (ParamType::with_default("r", ValueKind::Real, 1.5f64), "r:real = real(1.5e+00)"),
            (ParamType::with_default("s", ValueKind::String, "O'Neil"), r#"s:string = "O\'Neil""#),
            (
                ParamType::with_default("t", ValueKind::Timespan, TimeDelta::minutes(90)),
                "t:timespan = timespan(01:30:00)",
            ),
            (
                ParamType::with_default("d", ValueKind::Decimal, DecimalDefault::Literal("123.45".into())),
                "d:decimal = decimal(123.45)",
            ),
        ];

        for (param, expected) in cases {
            assert_eq!(param.unwrap().render(), expected);
        }
    }

    #[test]
    fn test_datetime_and_guid_defaults() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let param = ParamType::with_default("from", ValueKind::DateTime, dt).unwrap();
        assert_eq!(param.render(), "from:datetime = datetime(2024-01-02T03:04:05Z)");

        let id = Uuid::nil();
        let param = ParamType::with_default("id", ValueKind::Guid, id).unwrap();
        assert_eq!(param.render(), "id:guid = guid(00000000-0000-0000-0000-000000000000)");
    }

    #[test]
    fn test_type_mismatch() {
        assert_validation(ParamType::with_default("x", ValueKind::Int, 1i64));
        assert_validation(ParamType::with_default("x", ValueKind::Long, 1i32));
        assert_validation(ParamType::with_default("x", ValueKind::Bool, "true"));
        assert_validation(ParamType::with_default("x", ValueKind::Real, 1i32));
        assert_validation(ParamType::with_default("x", ValueKind::Timespan, 10i64));
    }

    #[test]
    fn test_dynamic_never_takes_default() {
        assert_validation(ParamType::with_default(
            "x",
            ValueKind::Dynamic,
            ParamDefault::Dynamic(b"{}".to_vec()),
        ));
        assert_validation(ParamType::with_default("x", ValueKind::Dynamic, "{}"));
        assert!(ParamType::new("x", ValueKind::Dynamic).is_ok());
    }

    #[test]
    fn test_decimal_defaults() {
        assert!(ParamType::with_default("d", ValueKind::Decimal, "123.45").is_ok());
        assert_validation(ParamType::with_default("d", ValueKind::Decimal, "12.34.56"));
        assert_validation(ParamType::with_default("d", ValueKind::Decimal, "abc"));
        assert_validation(ParamType::with_default("d", ValueKind::Decimal, None::<BigDecimal>));

        let big = BigDecimal::from_str("3.14159265358979323846").unwrap();
        let param = ParamType::with_default("pi", ValueKind::Decimal, big).unwrap();
        assert_eq!(param.render(), "pi:decimal = decimal(3.14159265358979323846)");
    }

    #[test]
    fn test_unknown_tag() {
        assert_validation(ParamType::from_tag("x", "integer", None));
        let param = ParamType::from_tag("x", "long", Some(5i64.into())).unwrap();
        assert_eq!(param.render(), "x:long = long(5)");
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_validation(ParamType::new("", ValueKind::Int));
    }

    #[test]
    fn test_empty_string_default_is_quoted() {
        let param = ParamType::with_default("s", ValueKind::String, "").unwrap();
        assert_eq!(param.render(), r#"s:string = """#);
    }

    #[test]
    fn test_declaration_clause() {
        assert_eq!(Definitions::new().to_declaration(), "");

        let definitions = Definitions::new()
            .add(ParamType::new("n", ValueKind::Long).unwrap())
            .unwrap()
            .add(ParamType::with_default("state", ValueKind::String, "TEXAS").unwrap())
            .unwrap();

        assert_eq!(
            definitions.to_declaration(),
            r#"declare query_parameters(n:long, state:string = "TEXAS");"#
        );
    }

    #[test]
    fn test_duplicate_declaration() {
        let definitions = Definitions::new()
            .add(ParamType::new("n", ValueKind::Long).unwrap())
            .unwrap();
        assert_validation(definitions.add(ParamType::new("n", ValueKind::Int).unwrap()));
    }

    #[test]
    fn test_parameter_literals() {
        let definitions = Definitions::new()
            .add(ParamType::new("n", ValueKind::Long).unwrap())
            .unwrap()
            .add(ParamType::new("state", ValueKind::String).unwrap())
            .unwrap()
            .add(ParamType::new("window", ValueKind::Timespan).unwrap())
            .unwrap();

        let literals = Parameters::new()
            .with("n", 10i64)
            .with("state", "TEXAS")
            .with("window", TimeDelta::hours(1))
            .to_literals(&definitions)
            .unwrap();

        assert_eq!(literals["n"], "long(10)");
        assert_eq!(literals["state"], "\"TEXAS\"");
        assert_eq!(literals["window"], "timespan(01:00:00)");
    }

    #[test]
    fn test_parameter_errors() {
        let definitions = Definitions::new()
            .add(ParamType::new("n", ValueKind::Long).unwrap())
            .unwrap();

        assert_validation(Parameters::new().with("missing", 1i64).to_literals(&definitions));
        assert_validation(Parameters::new().with("n", 1i32).to_literals(&definitions));
    }
}

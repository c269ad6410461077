//! Command-line parameter specs
//!
//! `--param name:kind[=value]` declares a query parameter and, when a value is
//! given, binds it. Values are parsed according to the declared kind.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeDelta};
use kusto_cli::api::query::params::is_decimal_literal;
use kusto_cli::api::query::{Definitions, ParamType, Parameters};
use kusto_cli::types::{Value, ValueKind};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ValueKind,
    pub value: Option<Value>,
}

/// Parse `name:kind` or `name:kind=value`
pub fn parse_param_spec(spec: &str) -> Result<ParamSpec> {
    let (declaration, raw_value) = match spec.split_once('=') {
        Some((declaration, value)) => (declaration, Some(value)),
        None => (spec, None),
    };

    let (name, tag) = declaration
        .split_once(':')
        .with_context(|| format!("Invalid parameter '{}': expected name:kind[=value]", spec))?;

    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid parameter '{}': name is empty", spec);
    }

    let kind: ValueKind = tag
        .trim()
        .parse()
        .with_context(|| format!("Invalid parameter '{}'", spec))?;

    let value = raw_value
        .map(|raw| parse_value(kind, raw))
        .transpose()
        .with_context(|| format!("Invalid value in parameter '{}'", spec))?;

    Ok(ParamSpec {
        name: name.to_string(),
        kind,
        value,
    })
}

/// Build declarations and bound values from a list of specs
pub fn build_parameters(specs: &[ParamSpec]) -> Result<(Definitions, Parameters)> {
    let mut definitions = Definitions::new();
    let mut parameters = Parameters::new();

    for spec in specs {
        definitions = definitions.add(ParamType::new(spec.name.clone(), spec.kind)?)?;
        if let Some(value) = &spec.value {
            parameters = parameters.with(spec.name.clone(), value.clone());
        }
    }

    Ok((definitions, parameters))
}

fn parse_value(kind: ValueKind, raw: &str) -> Result<Value> {
    let value = match kind {
        ValueKind::Bool => Value::from(raw.parse::<bool>().context("expected true or false")?),
        ValueKind::DateTime => {
            Value::from(DateTime::parse_from_rfc3339(raw).context("expected an RFC3339 timestamp")?)
        }
        ValueKind::Dynamic => {
            serde_json::from_str::<serde_json::Value>(raw).context("expected JSON")?;
            Value::dynamic(raw.as_bytes().to_vec())
        }
        ValueKind::Guid => Value::from(Uuid::parse_str(raw).context("expected a GUID")?),
        ValueKind::Int => Value::from(raw.parse::<i32>().context("expected a 32-bit integer")?),
        ValueKind::Long => Value::from(raw.parse::<i64>().context("expected a 64-bit integer")?),
        ValueKind::Real => Value::from(raw.parse::<f64>().context("expected a number")?),
        ValueKind::String => Value::from(raw),
        ValueKind::Timespan => Value::from(parse_timespan(raw)?),
        ValueKind::Decimal => {
            if !is_decimal_literal(raw) {
                bail!("expected a decimal number, got '{}'", raw);
            }
            Value::decimal(raw)
        }
    };
    Ok(value)
}

/// Parse `[-][d.]hh:mm:ss[.fffffff]`
pub fn parse_timespan(raw: &str) -> Result<TimeDelta> {
    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };

    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() != 3 {
        bail!("expected a timespan like 1.02:03:04.5, got '{}'", raw);
    }

    let (days, hours) = match parts[0].split_once('.') {
        Some((days, hours)) => (parse_unit(days, raw)?, parse_unit(hours, raw)?),
        None => (0, parse_unit(parts[0], raw)?),
    };
    let minutes = parse_unit(parts[1], raw)?;

    let (seconds, fraction) = match parts[2].split_once('.') {
        Some((seconds, fraction)) => (parse_unit(seconds, raw)?, fraction),
        None => (parse_unit(parts[2], raw)?, ""),
    };

    if hours > 23 || minutes > 59 || seconds > 59 {
        bail!("timespan component out of range in '{}'", raw);
    }
    if fraction.len() > 7 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        bail!("timespan fraction must be at most 7 digits in '{}'", raw);
    }

    let ticks: i64 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<7}", fraction).parse()?
    };

    let span = TimeDelta::days(days)
        + TimeDelta::hours(hours)
        + TimeDelta::minutes(minutes)
        + TimeDelta::seconds(seconds)
        + TimeDelta::nanoseconds(ticks * 100);

    Ok(if negative { -span } else { span })
}

fn parse_unit(part: &str, raw: &str) -> Result<i64> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        bail!("invalid timespan '{}'", raw);
    }
    Ok(part.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kusto_cli::types::timespan;

    #[test]
    fn test_declaration_only() {
        let spec = parse_param_spec("n:long").unwrap();
        assert_eq!(spec.name, "n");
        assert_eq!(spec.kind, ValueKind::Long);
        assert!(spec.value.is_none());
    }

    #[test]
    fn test_typed_values() {
        assert_eq!(parse_param_spec("n:long=42").unwrap().value, Some(Value::from(42i64)));
        assert_eq!(parse_param_spec("f:bool=true").unwrap().value, Some(Value::from(true)));
        assert_eq!(
            parse_param_spec("s:string=a=b").unwrap().value,
            Some(Value::from("a=b"))
        );
        assert_eq!(
            parse_param_spec("d:decimal=12.50").unwrap().value,
            Some(Value::decimal("12.50"))
        );
    }

    #[test]
    fn test_bad_specs() {
        for spec in ["novalue", ":long=1", "n:integer=1", "n:int=abc", "d:decimal=1.2.3", "j:dynamic={"] {
            let err = parse_param_spec(spec).unwrap_err();
            assert!(format!("{:#}", err).contains(spec), "{}: {:#}", spec, err);
        }
    }

    #[test]
    fn test_timespan_parsing() {
        assert_eq!(parse_timespan("01:30:00").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_timespan("1.02:00:00").unwrap(), TimeDelta::hours(26));
        assert_eq!(parse_timespan("-00:00:05").unwrap(), TimeDelta::seconds(-5));
        assert_eq!(parse_timespan("00:00:00.25").unwrap(), TimeDelta::milliseconds(250));
        assert!(parse_timespan("90").is_err());
        assert!(parse_timespan("00:61:00").is_err());

        let span = parse_timespan("2.03:04:05.0060007").unwrap();
        assert_eq!(timespan::marshal(Some(&span)), "2.03:04:05.0060007");
    }

    #[test]
    fn test_build_parameters() {
        let specs = vec![
            parse_param_spec("n:long=10").unwrap(),
            parse_param_spec("state:string").unwrap(),
        ];
        let (definitions, parameters) = build_parameters(&specs).unwrap();
        assert_eq!(
            definitions.to_declaration(),
            "declare query_parameters(n:long, state:string);"
        );
        assert_eq!(parameters.get("n"), Some(&Value::from(10i64)));
        assert!(parameters.get("state").is_none());

        let duplicate = vec![specs[0].clone(), specs[0].clone()];
        assert!(build_parameters(&duplicate).is_err());
    }
}

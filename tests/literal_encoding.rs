//! Value rendering, quoting and parameter declarations through the public API

use bigdecimal::BigDecimal;
use chrono::TimeDelta;
use kusto_cli::api::CloudInfo;
use kusto_cli::api::query::{DecimalDefault, Definitions, ParamType};
use kusto_cli::error::ErrorKind;
use kusto_cli::types::{Value, ValueKind, quote_string, timespan};

#[test]
fn test_unset_values_render_empty() {
    for kind in ValueKind::ALL {
        let value = Value::null(kind);
        assert!(!value.is_valid());
        assert_eq!(value.to_string(), "", "{}", kind);
    }
}

#[test]
fn test_unset_timespan_marshals_to_zero() {
    let value = Value::null(ValueKind::Timespan);
    assert_eq!(value.to_string(), "");
    assert_eq!(value.marshal_timespan().as_deref(), Some("00:00:00"));
}

#[test]
fn test_timespan_marshal() {
    let cases = [
        (TimeDelta::zero(), "00:00:00"),
        (TimeDelta::minutes(90), "01:30:00"),
        (TimeDelta::seconds(-5), "-00:00:05"),
        (TimeDelta::days(1) + TimeDelta::hours(2), "1.02:00:00"),
        (TimeDelta::milliseconds(250), "00:00:00.25"),
        (TimeDelta::milliseconds(1) + TimeDelta::nanoseconds(100), "00:00:00.0010001"),
        (TimeDelta::seconds(10), "00:00:10"),
    ];

    for (span, expected) in cases {
        assert_eq!(timespan::marshal(Some(&span)), expected);
        assert_eq!(Value::from(span).to_string(), expected);
    }
}

#[test]
fn test_string_quoting() {
    assert_eq!(quote_string("", false), "");
    assert_eq!(quote_string("a\"b", false), r#""a\"b""#);
    assert_eq!(quote_string("a\tb", false), r#""a\tb""#);
    assert_eq!(quote_string("€", false), r#""\u20ac""#);
    assert_eq!(quote_string("\u{85}", false), r#""\u0085""#);
    assert_eq!(quote_string("é", false), "\"é\"");
    assert_eq!(quote_string("secret", true), "h\"secret\"");
}

#[test]
fn test_value_literals() {
    assert_eq!(Value::from(5i32).to_literal(), "int(5)");
    assert_eq!(Value::from(true).to_literal(), "bool(true)");
    assert_eq!(Value::null(ValueKind::Long).to_literal(), "long(null)");
    assert_eq!(Value::from("it's").to_literal(), r#""it\'s""#);
    assert_eq!(Value::dynamic(br#"{"a":1}"#.to_vec()).to_literal(), r#"dynamic({"a":1})"#);
}

#[test]
fn test_decimal_defaults() {
    let valid = ParamType::with_default("d", ValueKind::Decimal, DecimalDefault::Literal("123.45".into()));
    assert_eq!(valid.unwrap().render(), "d:decimal = decimal(123.45)");

    for bad in ["12.34.56", "abc"] {
        let err = ParamType::with_default("d", ValueKind::Decimal, DecimalDefault::Literal(bad.into()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    let null = ParamType::with_default("d", ValueKind::Decimal, None::<BigDecimal>).unwrap_err();
    assert_eq!(null.kind(), ErrorKind::Validation);
}

#[test]
fn test_dynamic_default_rejected() {
    let err = ParamType::with_default("d", ValueKind::Dynamic, "{}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_declaration_clause() {
    let definitions = Definitions::new()
        .add(ParamType::new("from", ValueKind::DateTime).unwrap())
        .unwrap()
        .add(ParamType::with_default("window", ValueKind::Timespan, TimeDelta::minutes(5)).unwrap())
        .unwrap()
        .add(ParamType::with_default("tag", ValueKind::String, "a\"b").unwrap())
        .unwrap();

    assert_eq!(
        definitions.to_declaration(),
        r#"declare query_parameters(from:datetime, window:timespan = timespan(00:05:00), tag:string = "a\"b");"#
    );
}

#[test]
fn test_scope_derivation() {
    let mut cloud_info = CloudInfo {
        kusto_service_resource_id: "https://foo.kusto.windows.net".into(),
        ..CloudInfo::default()
    };
    assert_eq!(cloud_info.scope(), "https://foo.kusto.windows.net/.default");

    cloud_info.login_mfa_required = true;
    assert_eq!(cloud_info.scope(), "https://foo.kustomfa.windows.net/.default");
}

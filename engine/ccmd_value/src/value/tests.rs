use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_output_forms() {
    assert_eq!(Value::Null.to_output(), "");
    assert_eq!(Value::string("Nova").to_output(), "Nova");
    assert_eq!(Value::Int(5).to_output(), "5");
    assert_eq!(Value::Float(2.5).to_output(), "2.5");
    assert_eq!(Value::Float(5.0).to_output(), "5");
    assert_eq!(Value::Bool(false).to_output(), "false");
}

#[test]
fn test_output_of_structures_is_json() {
    let value = Value::map_from([
        ("title", Value::string("Hi")),
        ("fields", Value::list(vec![Value::Int(1), Value::Null])),
    ]);
    assert_eq!(value.to_output(), r#"{"fields":[1,null],"title":"Hi"}"#);
}

#[test]
fn test_truthiness() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Int(0).is_truthy());
    assert!(!Value::Float(f64::NAN).is_truthy());
    assert!(!Value::empty_str().is_truthy());
    assert!(!Value::list(vec![]).is_truthy());
    assert!(Value::string("0").is_truthy());
    assert!(Value::Int(-1).is_truthy());
    assert!(Value::map_from([("a", Value::Null)]).is_truthy());
}

#[test]
fn test_numeric_views() {
    assert_eq!(Value::string(" 42 ").as_int(), Some(42));
    assert_eq!(Value::Float(3.0).as_int(), Some(3));
    assert_eq!(Value::Float(3.5).as_int(), None);
    assert_eq!(Value::string("2.5").as_f64(), Some(2.5));
    assert_eq!(Value::string("inf").as_f64(), None);
    assert_eq!(Value::Bool(true).as_f64(), None);
}

#[test]
fn test_json_keeps_integer_types() {
    let parsed = Value::parse_json(r#"{"id": 7, "ratio": 0.5, "tags": ["a"]}"#);
    let Some(Value::Map(entries)) = parsed else {
        panic!("expected a map, got {parsed:?}");
    };
    assert_eq!(entries.get("id"), Some(&Value::Int(7)));
    assert_eq!(entries.get("ratio"), Some(&Value::Float(0.5)));
    assert_eq!(
        entries.get("tags"),
        Some(&Value::list(vec![Value::string("a")]))
    );
}

#[test]
fn test_parse_json_rejects_garbage() {
    assert_eq!(Value::parse_json("{not json"), None);
}

#[test]
fn test_non_finite_float_to_json_is_null() {
    assert_eq!(Value::Float(f64::INFINITY).to_json(), serde_json::Value::Null);
}

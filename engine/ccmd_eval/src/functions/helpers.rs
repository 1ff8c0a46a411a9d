//! Argument validation and shared utility functions.
//!
//! Arity is checked by the registry before a function runs, so a missing
//! argument here only means an optional one was omitted.

use std::borrow::Cow;
use std::cmp::Ordering;

use ccmd_value::{Map, Value};

use crate::errors::{
    integer_overflow, invalid_argument, not_finite, wrong_arg_type, FnError, FnResult,
};

/// Longest string a function may build.
pub const MAX_TEXT_LEN: usize = 100_000;
/// Longest list a function may build.
pub const MAX_LIST_LEN: usize = 10_000;

/// A number argument, keeping integer precision where the input had it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Numeric view of a value. Integer strings stay integers.
    pub fn from_value(value: &Value) -> Option<Number> {
        match value {
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Str(s) => match s.trim().parse::<i64>() {
                Ok(n) => Some(Number::Int(n)),
                Err(_) => value.as_f64().map(Number::Float),
            },
            _ => None,
        }
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }

    pub fn into_value(self) -> FnResult {
        match self {
            Number::Int(n) => Ok(Value::Int(n)),
            Number::Float(f) => finite(f),
        }
    }
}

/// Fail unless `f` is finite.
pub fn finite(f: f64) -> FnResult {
    if f.is_finite() {
        Ok(Value::Float(f))
    } else {
        Err(not_finite())
    }
}

/// A float that is integral and in range becomes an `Int`.
pub fn integral(f: f64) -> FnResult {
    match Value::Float(f).as_int() {
        Some(n) => Ok(Value::Int(n)),
        None => finite(f),
    }
}

pub fn require_number(args: &[Value], index: usize) -> Result<Number, FnError> {
    let value = arg(args, index);
    Number::from_value(value).ok_or_else(|| wrong_arg_type(index, "a number", value))
}

pub fn require_float(args: &[Value], index: usize) -> Result<f64, FnError> {
    require_number(args, index).map(Number::to_f64)
}

pub fn require_int(args: &[Value], index: usize) -> Result<i64, FnError> {
    let value = arg(args, index);
    value
        .as_int()
        .ok_or_else(|| wrong_arg_type(index, "an integer", value))
}

/// An integer that must be a valid length or position.
pub fn require_index(args: &[Value], index: usize) -> Result<usize, FnError> {
    let n = require_int(args, index)?;
    usize::try_from(n).map_err(|_| invalid_argument(format!("{n} is negative")))
}

pub fn require_str(args: &[Value], index: usize) -> Result<&str, FnError> {
    let value = arg(args, index);
    value
        .as_str()
        .ok_or_else(|| wrong_arg_type(index, "a string", value))
}

/// Any argument as text. Lists and maps render as JSON, up to
/// [`MAX_TEXT_LEN`] bytes.
pub fn text_arg(args: &[Value], index: usize) -> Result<Cow<'_, str>, FnError> {
    text_value(arg(args, index), index)
}

/// [`text_arg`] for a value already taken from position `index`.
pub fn text_value(value: &Value, index: usize) -> Result<Cow<'_, str>, FnError> {
    match value {
        Value::Str(s) => Ok(Cow::Borrowed(s.as_str())),
        other => render_arg(other, index).map(Cow::Owned),
    }
}

/// Render `value`, the argument at `index`, within [`MAX_TEXT_LEN`].
pub fn render_arg(value: &Value, index: usize) -> Result<String, FnError> {
    value.render(MAX_TEXT_LEN).map_err(|_| {
        invalid_argument(format!(
            "argument {} renders to more than {MAX_TEXT_LEN} bytes",
            index + 1
        ))
    })
}

pub fn require_list(args: &[Value], index: usize) -> Result<&[Value], FnError> {
    match arg(args, index) {
        Value::List(items) => Ok(items.as_slice()),
        other => Err(wrong_arg_type(index, "a list", other)),
    }
}

/// A map argument. JSON text that decodes to an object is accepted.
pub fn require_map(args: &[Value], index: usize) -> Result<Cow<'_, Map>, FnError> {
    let value = arg(args, index);
    match value {
        Value::Map(entries) => Ok(Cow::Borrowed(&**entries)),
        Value::Str(s) => match Value::parse_json(s) {
            Some(Value::Map(entries)) => Ok(Cow::Owned(entries.into_inner())),
            _ => Err(wrong_arg_type(index, "a map", value)),
        },
        other => Err(wrong_arg_type(index, "a map", other)),
    }
}

/// An identifier argument: non-empty text or an integer.
pub fn require_id(args: &[Value], index: usize) -> Result<String, FnError> {
    match arg(args, index) {
        Value::Str(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::Int(n) => Ok(n.to_string()),
        other => Err(wrong_arg_type(index, "an identifier", other)),
    }
}

/// Optional argument: `None` when omitted.
#[inline]
pub fn optional(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index)
}

/// The argument at `index`, or null when omitted.
#[inline]
pub fn arg(args: &[Value], index: usize) -> &Value {
    const NULL: &Value = &Value::Null;
    args.get(index).unwrap_or(NULL)
}

pub fn len_to_value(len: usize) -> FnResult {
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| integer_overflow("length"))
}

/// Fail if a string being built would exceed [`MAX_TEXT_LEN`].
pub fn check_text_len(len: usize) -> Result<(), FnError> {
    if len > MAX_TEXT_LEN {
        Err(invalid_argument(format!(
            "result would be {len} bytes, limit is {MAX_TEXT_LEN}"
        )))
    } else {
        Ok(())
    }
}

/// Fail if a list being built would exceed [`MAX_LIST_LEN`].
pub fn check_list_len(len: usize) -> Result<(), FnError> {
    if len > MAX_LIST_LEN {
        Err(invalid_argument(format!(
            "result would have {len} items, limit is {MAX_LIST_LEN}"
        )))
    } else {
        Ok(())
    }
}

/// Loose equality used by the comparison functions.
///
/// Numbers compare by value across `Int` and `Float`. A number and a string
/// compare by their rendered text, so `eq .User.ID 42` works when the
/// context carries identifiers as strings.
#[allow(clippy::float_cmp, reason = "template equality is exact")]
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Str(s)) | (Value::Str(s), Value::Null) => s.is_empty(),
        _ if a.is_number() || b.is_number() => {
            match (Number::from_value(a), Number::from_value(b)) {
                (Some(Number::Int(x)), Some(Number::Int(y))) => x == y,
                (Some(x), Some(y)) => x.to_f64() == y.to_f64(),
                _ => false,
            }
        }
        _ => a == b,
    }
}

/// Ordering used by `lt`, `sort` and friends.
///
/// Two numbers (or numeric strings beside a number) compare numerically;
/// two strings compare lexicographically. Anything else is incomparable.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Some(x.as_str().cmp(y.as_str())),
        _ if a.is_number() || b.is_number() => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn test_loose_eq() {
        assert!(loose_eq(&Value::Int(5), &Value::Float(5.0)));
        assert!(loose_eq(&Value::string("42"), &Value::Int(42)));
        assert!(!loose_eq(&Value::string("42x"), &Value::Int(42)));
        assert!(loose_eq(&Value::Null, &Value::empty_str()));
        assert!(!loose_eq(&Value::Bool(true), &Value::Int(1)));
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(&Value::Int(2), &Value::Int(10)), Some(Ordering::Less));
        assert_eq!(
            compare(&Value::string("2"), &Value::string("10")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare(&Value::string("2"), &Value::Int(10)),
            Some(Ordering::Less)
        );
        assert_eq!(compare(&Value::list(vec![]), &Value::Int(1)), None);
    }

    #[test]
    fn test_require_map_accepts_json_text() {
        let args = [Value::string(r#"{"a": 1}"#)];
        assert_eq!(require_map(&args, 0).map(|m| m.len()), Ok(1));
        let args = [Value::string("[1]")];
        assert!(require_map(&args, 0).is_err());
    }

    #[test]
    fn test_text_arg_is_bounded() {
        let mut value = Value::string("xy");
        for _ in 0..30 {
            value = Value::list(vec![value.clone(), value]);
        }
        let err = text_arg(&[Value::Null, value], 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("argument 2 renders to more than {MAX_TEXT_LEN} bytes")
        );
        assert_eq!(text_arg(&[Value::Int(7)], 0).as_deref(), Ok("7"));
    }

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(&[Value::Int(9)], 0), Ok("9".to_string()));
        assert!(require_id(&[Value::empty_str()], 0).is_err());
    }
}

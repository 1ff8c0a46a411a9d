//! Comparison, boolean logic and `if`.
//!
//! Arguments are evaluated before the call, so `if` picks between values
//! that have both been computed; it is a selector, not a branch.

use std::cmp::Ordering;

use ccmd_value::Value;

use super::helpers::{arg, compare, loose_eq, text_arg};
use crate::errors::{wrong_arg_type, FnError, FnResult};
use crate::registry::{Arity, FunctionRegistry};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register_pure("eq", Arity::AtLeast(2), eq);
    registry.register_pure("ne", Arity::Exact(2), ne);
    registry.register_pure("lt", Arity::Exact(2), lt);
    registry.register_pure("le", Arity::Exact(2), le);
    registry.register_pure("gt", Arity::Exact(2), gt);
    registry.register_pure("ge", Arity::Exact(2), ge);
    registry.register_pure("and", Arity::AtLeast(1), and);
    registry.register_pure("or", Arity::AtLeast(1), or);
    registry.register_pure("not", Arity::Exact(1), not);
    registry.register_pure("in", Arity::Exact(2), contains);
    registry.register_pure("if", Arity::Between(2, 3), select);
}

/// `eq a b c...` is true when `a` equals any of the others.
fn eq(args: &[Value]) -> FnResult {
    let first = &args[0];
    Ok(Value::Bool(args[1..].iter().any(|other| loose_eq(first, other))))
}

fn ne(args: &[Value]) -> FnResult {
    Ok(Value::Bool(!loose_eq(arg(args, 0), arg(args, 1))))
}

fn ordering(args: &[Value]) -> Result<Ordering, FnError> {
    let (a, b) = (arg(args, 0), arg(args, 1));
    compare(a, b).ok_or_else(|| {
        FnError::new(format!(
            "cannot compare {} with {}",
            a.type_name(),
            b.type_name()
        ))
    })
}

fn lt(args: &[Value]) -> FnResult {
    Ok(Value::Bool(ordering(args)?.is_lt()))
}

fn le(args: &[Value]) -> FnResult {
    Ok(Value::Bool(ordering(args)?.is_le()))
}

fn gt(args: &[Value]) -> FnResult {
    Ok(Value::Bool(ordering(args)?.is_gt()))
}

fn ge(args: &[Value]) -> FnResult {
    Ok(Value::Bool(ordering(args)?.is_ge()))
}

fn and(args: &[Value]) -> FnResult {
    Ok(Value::Bool(args.iter().all(Value::is_truthy)))
}

fn or(args: &[Value]) -> FnResult {
    Ok(Value::Bool(args.iter().any(Value::is_truthy)))
}

fn not(args: &[Value]) -> FnResult {
    Ok(Value::Bool(!arg(args, 0).is_truthy()))
}

/// `in collection item`: list membership, map key presence, or substring.
fn contains(args: &[Value]) -> FnResult {
    let item = arg(args, 1);
    let found = match arg(args, 0) {
        Value::List(items) => items.iter().any(|v| loose_eq(v, item)),
        Value::Map(entries) => entries.contains_key(&*text_arg(args, 1)?),
        Value::Str(s) => s.contains(&*text_arg(args, 1)?),
        Value::Null => false,
        other => return Err(wrong_arg_type(0, "a list, map or string", other)),
    };
    Ok(Value::Bool(found))
}

/// `if cond then [else]`. A false condition with no `else` is null.
fn select(args: &[Value]) -> FnResult {
    if arg(args, 0).is_truthy() {
        Ok(arg(args, 1).clone())
    } else {
        Ok(arg(args, 2).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(text: &str) -> Value {
        Value::string(text)
    }

    #[test]
    fn test_equality() {
        assert_eq!(eq(&[Value::Int(1), Value::Int(1)]), Ok(Value::Bool(true)));
        assert_eq!(eq(&[s("b"), s("a"), s("b")]), Ok(Value::Bool(true)));
        assert_eq!(eq(&[s("42"), Value::Int(42)]), Ok(Value::Bool(true)));
        assert_eq!(ne(&[s("a"), s("b")]), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_ordering() {
        assert_eq!(lt(&[Value::Int(1), Value::Float(1.5)]), Ok(Value::Bool(true)));
        assert_eq!(ge(&[s("b"), s("a")]), Ok(Value::Bool(true)));
        assert_eq!(le(&[Value::Int(2), Value::Int(2)]), Ok(Value::Bool(true)));
        assert_eq!(gt(&[s("10"), Value::Int(9)]), Ok(Value::Bool(true)));
        assert!(lt(&[Value::list(vec![]), Value::Int(1)]).is_err());
    }

    #[test]
    fn test_boolean_logic() {
        assert_eq!(and(&[Value::Int(1), s("x")]), Ok(Value::Bool(true)));
        assert_eq!(and(&[Value::Int(1), s("")]), Ok(Value::Bool(false)));
        assert_eq!(or(&[Value::Null, Value::Int(0), s("y")]), Ok(Value::Bool(true)));
        assert_eq!(not(&[Value::Null]), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_membership() {
        let list = Value::list(vec![s("a"), Value::Int(2)]);
        assert_eq!(contains(&[list.clone(), s("2")]), Ok(Value::Bool(true)));
        assert_eq!(contains(&[list, s("z")]), Ok(Value::Bool(false)));
        let map = Value::map_from([("key", Value::Null)]);
        assert_eq!(contains(&[map, s("key")]), Ok(Value::Bool(true)));
        assert_eq!(contains(&[s("hello"), s("ell")]), Ok(Value::Bool(true)));
        assert!(contains(&[Value::Int(5), Value::Int(5)]).is_err());
    }

    #[test]
    fn test_select() {
        assert_eq!(select(&[Value::Bool(true), s("yes"), s("no")]), Ok(s("yes")));
        assert_eq!(select(&[Value::Int(0), s("yes"), s("no")]), Ok(s("no")));
        assert_eq!(select(&[Value::Int(0), s("yes")]), Ok(Value::Null));
    }
}

//! String functions and conversions.

use ccmd_value::Value;
use regex::Regex;

use super::format::printf;
use super::helpers::{
    arg, check_list_len, check_text_len, optional, render_arg, require_index, require_int,
    require_str, text_arg, Number,
};
use crate::errors::{integer_overflow, invalid_pattern, wrong_arg_type, FnError, FnResult};
use crate::registry::{Arity, FunctionRegistry};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register_pure("lower", Arity::Exact(1), lower);
    registry.register_pure("upper", Arity::Exact(1), upper);
    registry.register_pure("title", Arity::Exact(1), title);
    registry.register_pure("trim", Arity::Between(1, 2), trim);
    registry.register_pure("trimPrefix", Arity::Exact(2), trim_prefix);
    registry.register_pure("trimSuffix", Arity::Exact(2), trim_suffix);
    registry.register_pure("split", Arity::Exact(2), split);
    registry.register_pure("joinStr", Arity::AtLeast(1), join_str);
    registry.register_pure("hasPrefix", Arity::Exact(2), has_prefix);
    registry.register_pure("hasSuffix", Arity::Exact(2), has_suffix);
    registry.register_pure("replace", Arity::Between(3, 4), replace);
    registry.register_pure("repeat", Arity::Exact(2), repeat);
    registry.register_pure("printf", Arity::AtLeast(1), printf);
    registry.register_pure("print", Arity::AtLeast(0), print);
    registry.register_pure("str", Arity::Exact(1), str);
    registry.register_pure("toInt", Arity::Exact(1), to_int);
    registry.register_pure("toFloat", Arity::Exact(1), to_float);
    registry.register_pure("reMatch", Arity::Exact(2), re_match);
    registry.register_pure("reFind", Arity::Exact(2), re_find);
    registry.register_pure("reFindAll", Arity::Between(2, 3), re_find_all);
    registry.register_pure("reReplace", Arity::Exact(3), re_replace);
}

fn lower(args: &[Value]) -> FnResult {
    Ok(Value::string(text_arg(args, 0)?.to_lowercase()))
}

fn upper(args: &[Value]) -> FnResult {
    Ok(Value::string(text_arg(args, 0)?.to_uppercase()))
}

/// Capitalize the first letter of every word; the rest is left alone.
fn title(args: &[Value]) -> FnResult {
    let text = text_arg(args, 0)?;
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    Ok(Value::string(out))
}

fn trim(args: &[Value]) -> FnResult {
    let text = text_arg(args, 0)?;
    let trimmed = match optional(args, 1) {
        Some(cutset) => {
            let cutset = render_arg(cutset, 1)?;
            text.trim_matches(|c: char| cutset.contains(c)).to_string()
        }
        None => text.trim().to_string(),
    };
    Ok(Value::string(trimmed))
}

fn trim_prefix(args: &[Value]) -> FnResult {
    let text = text_arg(args, 0)?;
    let prefix = text_arg(args, 1)?;
    Ok(Value::string(
        text.strip_prefix(&*prefix).unwrap_or(&*text),
    ))
}

fn trim_suffix(args: &[Value]) -> FnResult {
    let text = text_arg(args, 0)?;
    let suffix = text_arg(args, 1)?;
    Ok(Value::string(
        text.strip_suffix(&*suffix).unwrap_or(&*text),
    ))
}

/// Split on a separator. An empty separator splits into characters.
fn split(args: &[Value]) -> FnResult {
    let text = text_arg(args, 0)?;
    let separator = text_arg(args, 1)?;
    let parts: Vec<Value> = if separator.is_empty() {
        text.chars().map(|c| Value::string(c.to_string())).collect()
    } else {
        text.split(&*separator).map(Value::string).collect()
    };
    check_list_len(parts.len())?;
    Ok(Value::list(parts))
}

/// `joinStr sep a b ...` joins the remaining arguments with `sep`. List
/// arguments contribute each of their items.
fn join_str(args: &[Value]) -> FnResult {
    let separator = text_arg(args, 0)?;
    let mut joined = String::new();
    let mut first = true;
    for (index, value) in args.iter().enumerate().skip(1) {
        let items = match value {
            Value::List(items) => items.as_slice(),
            other => std::slice::from_ref(other),
        };
        for item in items {
            if !first {
                joined.push_str(&separator);
            }
            first = false;
            joined.push_str(&render_arg(item, index)?);
            check_text_len(joined.len())?;
        }
    }
    Ok(Value::string(joined))
}

fn has_prefix(args: &[Value]) -> FnResult {
    Ok(Value::Bool(
        text_arg(args, 0)?.starts_with(&*text_arg(args, 1)?),
    ))
}

fn has_suffix(args: &[Value]) -> FnResult {
    Ok(Value::Bool(
        text_arg(args, 0)?.ends_with(&*text_arg(args, 1)?),
    ))
}

/// `replace s old new [n]`: replace the first `n` occurrences, or all of
/// them when `n` is omitted or negative.
fn replace(args: &[Value]) -> FnResult {
    let text = text_arg(args, 0)?;
    let from = text_arg(args, 1)?;
    let to = text_arg(args, 2)?;
    let limit = match optional(args, 3) {
        Some(_) => usize::try_from(require_int(args, 3)?).unwrap_or(usize::MAX),
        None => usize::MAX,
    };
    // An empty pattern matches at every character boundary, so size the
    // result before building it.
    let count = text.matches(&*from).take(limit).count();
    let len = to
        .len()
        .checked_mul(count)
        .and_then(|added| (text.len() - from.len() * count).checked_add(added))
        .ok_or_else(|| integer_overflow("replace"))?;
    check_text_len(len)?;
    Ok(Value::string(text.replacen(&*from, &to, limit)))
}

fn repeat(args: &[Value]) -> FnResult {
    let text = text_arg(args, 0)?;
    let count = require_index(args, 1)?;
    let len = text
        .len()
        .checked_mul(count)
        .ok_or_else(|| integer_overflow("repeat"))?;
    check_text_len(len)?;
    Ok(Value::string(text.repeat(count)))
}

/// Concatenate the rendered arguments.
fn print(args: &[Value]) -> FnResult {
    let mut out = String::new();
    for (index, value) in args.iter().enumerate() {
        out.push_str(&render_arg(value, index)?);
        check_text_len(out.len())?;
    }
    Ok(Value::string(out))
}

fn str(args: &[Value]) -> FnResult {
    Ok(Value::string(text_arg(args, 0)?))
}

/// To an integer, truncating floats toward zero.
fn to_int(args: &[Value]) -> FnResult {
    let value = arg(args, 0);
    let n = match value {
        Value::Bool(b) => i64::from(*b),
        _ => match Number::from_value(value) {
            Some(Number::Int(n)) => n,
            Some(Number::Float(f)) => {
                let truncated = f.trunc();
                if !truncated.is_finite() || truncated.abs() >= i64::MAX as f64 {
                    return Err(integer_overflow("toInt"));
                }
                truncated as i64
            }
            None => return Err(wrong_arg_type(0, "a number", value)),
        },
    };
    Ok(Value::Int(n))
}

fn to_float(args: &[Value]) -> FnResult {
    let value = arg(args, 0);
    match value {
        Value::Bool(b) => Ok(Value::Float(f64::from(u8::from(*b)))),
        _ => value
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| wrong_arg_type(0, "a number", value)),
    }
}

fn compile(args: &[Value]) -> Result<Regex, FnError> {
    let pattern = require_str(args, 0)?;
    Regex::new(pattern).map_err(|e| invalid_pattern(&e))
}

fn re_match(args: &[Value]) -> FnResult {
    let re = compile(args)?;
    Ok(Value::Bool(re.is_match(&text_arg(args, 1)?)))
}

/// The first match, or empty text.
fn re_find(args: &[Value]) -> FnResult {
    let re = compile(args)?;
    let text = text_arg(args, 1)?;
    Ok(re
        .find(&text)
        .map_or_else(Value::empty_str, |m| Value::string(m.as_str())))
}

/// Every match, or the first `n` when `n` is given.
fn re_find_all(args: &[Value]) -> FnResult {
    let re = compile(args)?;
    let text = text_arg(args, 1)?;
    let limit = match optional(args, 2) {
        Some(_) => require_index(args, 2)?,
        None => usize::MAX,
    };
    let matches: Vec<Value> = re
        .find_iter(&text)
        .take(limit)
        .map(|m| Value::string(m.as_str()))
        .collect();
    check_list_len(matches.len())?;
    Ok(Value::list(matches))
}

/// Replace every match. `$1` and `${name}` in the replacement expand.
fn re_replace(args: &[Value]) -> FnResult {
    let re = compile(args)?;
    let text = text_arg(args, 1)?;
    let replacement = text_arg(args, 2)?;
    // Every group lies inside its match, so one expansion is at most the
    // replacement plus the match once per `$` reference.
    let references = replacement.matches('$').count();
    let mut out = String::new();
    let mut last = 0;
    for caps in re.captures_iter(&text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        let bound = whole
            .len()
            .saturating_mul(references)
            .saturating_add(replacement.len())
            .saturating_add(out.len());
        check_text_len(bound)?;
        caps.expand(&replacement, &mut out);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    check_text_len(out.len())?;
    Ok(Value::string(out))
}

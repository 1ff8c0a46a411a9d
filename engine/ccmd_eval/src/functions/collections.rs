//! Positional and collection functions.

use std::cmp::Ordering;

use ccmd_value::Value;

use super::helpers::{
    arg, check_list_len, compare, len_to_value, optional, require_int, require_list, text_arg,
    text_value,
};
use super::random;
use crate::errors::{index_out_of_bounds, invalid_argument, wrong_arg_type, FnError, FnResult};
use crate::registry::{Arity, FunctionRegistry};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register_pure("index", Arity::AtLeast(2), index);
    registry.register_pure("slice", Arity::Between(2, 3), slice);
    registry.register_pure("seq", Arity::Between(1, 3), seq);
    registry.register_pure("shuffle", Arity::Exact(1), shuffle);
    registry.register_pure("sort", Arity::Between(1, 3), sort);
    registry.register_pure("len", Arity::Exact(1), len);
}

/// Convert a possibly negative index into a position, if in bounds.
fn position(index: i64, len: usize) -> Result<usize, FnError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| index_out_of_bounds(index, len))
}

/// `index coll k1 k2 ...` walks one key per argument. Lists and strings
/// take integer positions; maps take keys, and a missing key is null.
fn index(args: &[Value]) -> FnResult {
    let mut current = args[0].clone();
    for (offset, key) in args[1..].iter().enumerate() {
        let key_index = offset + 1;
        current = match &current {
            Value::List(items) => {
                let at = key
                    .as_int()
                    .ok_or_else(|| wrong_arg_type(key_index, "an integer", key))?;
                items[position(at, items.len())?].clone()
            }
            Value::Map(entries) => entries
                .get(&*text_value(key, key_index)?)
                .cloned()
                .unwrap_or_default(),
            Value::Str(s) => {
                let at = key
                    .as_int()
                    .ok_or_else(|| wrong_arg_type(key_index, "an integer", key))?;
                let count = s.chars().count();
                let at = position(at, count)?;
                s.chars()
                    .nth(at)
                    .map_or_else(Value::empty_str, |c| Value::string(c.to_string()))
            }
            Value::Null => Value::Null,
            other => return Err(wrong_arg_type(0, "a list, map or string", other)),
        };
    }
    Ok(current)
}

/// Resolve `start [end]` against a length; `end` defaults to the length.
fn bounds(args: &[Value], len: usize) -> Result<(usize, usize), FnError> {
    let start = require_int(args, 1)?;
    let end = match optional(args, 2) {
        Some(_) => require_int(args, 2)?,
        None => i64::try_from(len).unwrap_or(i64::MAX),
    };
    let start_pos = usize::try_from(start).map_err(|_| index_out_of_bounds(start, len))?;
    let end_pos = usize::try_from(end).map_err(|_| index_out_of_bounds(end, len))?;
    if end_pos > len {
        return Err(index_out_of_bounds(end, len));
    }
    if start_pos > end_pos {
        return Err(invalid_argument(format!("slice start {start} is past end {end}")));
    }
    Ok((start_pos, end_pos))
}

/// `slice coll start [end]` on a list or (by characters) a string.
fn slice(args: &[Value]) -> FnResult {
    match arg(args, 0) {
        Value::List(items) => {
            let (start, end) = bounds(args, items.len())?;
            Ok(Value::list(items[start..end].to_vec()))
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (start, end) = bounds(args, chars.len())?;
            Ok(Value::string(chars[start..end].iter().collect::<String>()))
        }
        other => Err(wrong_arg_type(0, "a list or string", other)),
    }
}

/// `seq n`, `seq start end` or `seq start end step`; `end` is exclusive.
fn seq(args: &[Value]) -> FnResult {
    let (start, end) = if args.len() == 1 {
        (0, require_int(args, 0)?)
    } else {
        (require_int(args, 0)?, require_int(args, 1)?)
    };
    let step = match optional(args, 2) {
        Some(_) => require_int(args, 2)?,
        None => 1,
    };
    if step == 0 {
        return Err(invalid_argument("seq step must not be zero"));
    }
    let count = if (step > 0 && end > start) || (step < 0 && end < start) {
        end.abs_diff(start).div_ceil(step.unsigned_abs())
    } else {
        0
    };
    check_list_len(usize::try_from(count).unwrap_or(usize::MAX))?;
    let mut items = Vec::with_capacity(count as usize);
    let mut n = start;
    for _ in 0..count {
        items.push(Value::Int(n));
        // The last step may overflow past `end`; it is never pushed.
        n = n.saturating_add(step);
    }
    Ok(Value::list(items))
}

fn shuffle(args: &[Value]) -> FnResult {
    let mut items = require_list(args, 0)?.to_vec();
    random::shuffle(&mut items)?;
    Ok(Value::list(items))
}

/// `sort list [key] [reverse]`. Elements (or, for a list of maps, the
/// values at `key`) must be all numbers or all strings.
fn sort(args: &[Value]) -> FnResult {
    let items = require_list(args, 0)?;
    let mut key: Option<String> = None;
    let mut reverse = false;
    for (i, option) in args.iter().enumerate().skip(1) {
        match option {
            Value::Bool(b) => reverse = *b,
            Value::Str(_) | Value::Int(_) => key = Some(text_arg(args, i)?.into_owned()),
            other => return Err(wrong_arg_type(i, "a key or a bool", other)),
        }
    }

    let mut keyed = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let sort_key = match (&key, item) {
            (None, _) => item.clone(),
            (Some(k), Value::Map(entries)) => entries
                .get(k)
                .cloned()
                .ok_or_else(|| invalid_argument(format!("element {i} has no key `{k}`")))?,
            (Some(_), other) => return Err(wrong_arg_type(0, "a list of maps", other)),
        };
        keyed.push((sort_key, item.clone()));
    }

    let all_numbers = keyed.iter().all(|(k, _)| k.is_number());
    let all_strings = keyed.iter().all(|(k, _)| k.as_str().is_some());
    if !all_numbers && !all_strings {
        return Err(FnError::new("cannot sort a mix of numbers and other values"));
    }
    keyed.sort_by(|(a, _), (b, _)| compare(a, b).unwrap_or(Ordering::Equal));
    if reverse {
        keyed.reverse();
    }
    Ok(Value::list(keyed.into_iter().map(|(_, item)| item).collect()))
}

/// Characters of a string, items of a list, or entries of a map.
fn len(args: &[Value]) -> FnResult {
    match arg(args, 0) {
        Value::Str(s) => len_to_value(s.chars().count()),
        Value::List(items) => len_to_value(items.len()),
        Value::Map(entries) => len_to_value(entries.len()),
        Value::Null => Ok(Value::Int(0)),
        other => Err(wrong_arg_type(0, "a string, list or map", other)),
    }
}

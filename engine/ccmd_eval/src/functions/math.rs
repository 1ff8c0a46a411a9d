//! Arithmetic.
//!
//! Integer arithmetic is checked: overflow is an error, never a wrap.
//! Mixing an integer with a float promotes to float. List arguments to the
//! reducing functions (`add`, `mult`, `min`, `max`) contribute their items.

use ccmd_value::Value;

use super::helpers::{finite, integral, optional, require_float, require_int, require_number, Number};
use super::random;
use crate::errors::{
    division_by_zero, integer_overflow, invalid_argument, modulo_by_zero, not_finite,
    wrong_arg_type, FnError, FnResult,
};
use crate::registry::{Arity, FunctionRegistry};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register_pure("add", Arity::AtLeast(1), add);
    registry.register_pure("sub", Arity::AtLeast(2), sub);
    registry.register_pure("mult", Arity::AtLeast(1), mult);
    registry.register_pure("div", Arity::AtLeast(2), div);
    registry.register_pure("fdiv", Arity::Exact(2), fdiv);
    registry.register_pure("mod", Arity::Exact(2), modulo);
    registry.register_pure("pow", Arity::Exact(2), pow);
    registry.register_pure("abs", Arity::Exact(1), abs);
    registry.register_pure("min", Arity::AtLeast(1), min);
    registry.register_pure("max", Arity::AtLeast(1), max);
    registry.register_pure("round", Arity::Between(1, 2), round);
    registry.register_pure("floor", Arity::Exact(1), floor);
    registry.register_pure("ceil", Arity::Exact(1), ceil);
    registry.register_pure("randInt", Arity::Between(1, 2), rand_int);
}

/// Every numeric operand, with list arguments flattened one level.
fn operands(args: &[Value]) -> Result<Vec<Number>, FnError> {
    let mut out = Vec::with_capacity(args.len());
    for (index, value) in args.iter().enumerate() {
        match value {
            Value::List(items) => {
                for item in items.iter() {
                    out.push(
                        Number::from_value(item)
                            .ok_or_else(|| wrong_arg_type(index, "a list of numbers", item))?,
                    );
                }
            }
            _ => out.push(
                Number::from_value(value).ok_or_else(|| wrong_arg_type(index, "a number", value))?,
            ),
        }
    }
    Ok(out)
}

/// Left fold with a checked integer op and a float op.
fn fold(
    numbers: &[Number],
    operation: &'static str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> FnResult {
    let Some((&first, rest)) = numbers.split_first() else {
        return Err(invalid_argument("no numbers to operate on"));
    };
    let mut acc = first;
    for &n in rest {
        acc = match (acc, n) {
            (Number::Int(a), Number::Int(b)) => {
                Number::Int(int_op(a, b).ok_or_else(|| integer_overflow(operation))?)
            }
            (a, b) => Number::Float(float_op(a.to_f64(), b.to_f64())),
        };
    }
    acc.into_value()
}

fn add(args: &[Value]) -> FnResult {
    fold(&operands(args)?, "addition", i64::checked_add, |a, b| a + b)
}

fn sub(args: &[Value]) -> FnResult {
    fold(&operands(args)?, "subtraction", i64::checked_sub, |a, b| a - b)
}

fn mult(args: &[Value]) -> FnResult {
    fold(&operands(args)?, "multiplication", i64::checked_mul, |a, b| a * b)
}

/// Integer division truncates toward zero; any float operand makes it a
/// float division.
fn div(args: &[Value]) -> FnResult {
    let numbers = operands(args)?;
    if numbers.iter().skip(1).any(|n| n.to_f64() == 0.0) {
        return Err(division_by_zero());
    }
    fold(&numbers, "division", i64::checked_div, |a, b| a / b)
}

/// Always a float division.
fn fdiv(args: &[Value]) -> FnResult {
    let a = require_float(args, 0)?;
    let b = require_float(args, 1)?;
    if b == 0.0 {
        return Err(division_by_zero());
    }
    finite(a / b)
}

fn modulo(args: &[Value]) -> FnResult {
    match (require_number(args, 0)?, require_number(args, 1)?) {
        (_, Number::Int(0)) => Err(modulo_by_zero()),
        (Number::Int(a), Number::Int(b)) => a
            .checked_rem(b)
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("modulo")),
        (a, b) => {
            if b.to_f64() == 0.0 {
                return Err(modulo_by_zero());
            }
            finite(a.to_f64() % b.to_f64())
        }
    }
}

/// Integer powers stay integers when the exponent is a small non-negative
/// integer.
fn pow(args: &[Value]) -> FnResult {
    match (require_number(args, 0)?, require_number(args, 1)?) {
        (Number::Int(base), Number::Int(exp)) if exp >= 0 => {
            let exp = u32::try_from(exp).map_err(|_| integer_overflow("power"))?;
            base.checked_pow(exp)
                .map(Value::Int)
                .ok_or_else(|| integer_overflow("power"))
        }
        (base, exp) => {
            let result = base.to_f64().powf(exp.to_f64());
            if result.is_nan() {
                return Err(not_finite());
            }
            finite(result)
        }
    }
}

fn abs(args: &[Value]) -> FnResult {
    match require_number(args, 0)? {
        Number::Int(n) => n
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("abs")),
        Number::Float(f) => finite(f.abs()),
    }
}

fn extreme(args: &[Value], want_max: bool) -> FnResult {
    let beats = |n: Number, best: Number| match (n, best) {
        (Number::Int(x), Number::Int(y)) => {
            if want_max {
                x > y
            } else {
                x < y
            }
        }
        _ if want_max => n.to_f64() > best.to_f64(),
        _ => n.to_f64() < best.to_f64(),
    };
    let mut best: Option<Number> = None;
    for n in operands(args)? {
        if best.is_none_or(|b| beats(n, b)) {
            best = Some(n);
        }
    }
    best.ok_or_else(|| invalid_argument("no numbers to compare"))?
        .into_value()
}

fn min(args: &[Value]) -> FnResult {
    extreme(args, false)
}

fn max(args: &[Value]) -> FnResult {
    extreme(args, true)
}

/// `round x [digits]`: half away from zero. Whole results are integers.
fn round(args: &[Value]) -> FnResult {
    let x = require_float(args, 0)?;
    match optional(args, 1) {
        Some(_) => {
            let digits = require_int(args, 1)?.clamp(0, 15) as i32;
            let scale = 10f64.powi(digits);
            let rounded = (x * scale).round() / scale;
            if digits == 0 {
                integral(rounded)
            } else {
                finite(rounded)
            }
        }
        None => integral(x.round()),
    }
}

fn floor(args: &[Value]) -> FnResult {
    integral(require_float(args, 0)?.floor())
}

fn ceil(args: &[Value]) -> FnResult {
    integral(require_float(args, 0)?.ceil())
}

/// `randInt max` is in `0..max`; `randInt min max` is in `min..max`.
fn rand_int(args: &[Value]) -> FnResult {
    let (lo, hi) = if args.len() == 1 {
        (0, require_int(args, 0)?)
    } else {
        (require_int(args, 0)?, require_int(args, 1)?)
    };
    if hi <= lo {
        return Err(invalid_argument(format!("empty range {lo}..{hi}")));
    }
    let span = hi.abs_diff(lo);
    let offset = random::below(span)?;
    lo.checked_add_unsigned(offset)
        .map(Value::Int)
        .ok_or_else(|| integer_overflow("randInt"))
}

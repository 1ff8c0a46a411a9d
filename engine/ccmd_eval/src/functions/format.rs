//! `printf` formatting.
//!
//! Supports the verbs `%s %v %d %f %e %x %X %o %b %q %t` and the literal
//! `%%`, with flags `-` (left-align), `+` (always sign), space (space for a
//! positive sign) and `0` (zero-pad numbers), an optional width and an
//! optional `.precision`. Numbers are right-aligned by default, like C.

use ccmd_value::Value;

use super::helpers::{check_text_len, text_arg, text_value};
use crate::errors::{invalid_argument, wrong_arg_type, FnError, FnResult};

/// Parsed `%` directive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Format `args[1..]` into the format string `args[0]`.
pub(super) fn printf(args: &[Value]) -> FnResult {
    let format = text_arg(args, 0)?;
    let mut values = args.iter().enumerate().skip(1);
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '0' => spec.zero = true,
                _ => break,
            }
            chars.next();
        }
        spec.width = take_number(&mut chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_number(&mut chars).unwrap_or(0));
        }
        let Some(verb) = chars.next() else {
            return Err(invalid_argument("format ends with an incomplete directive"));
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        let Some((index, value)) = values.next() else {
            return Err(invalid_argument(format!("missing argument for %{verb}")));
        };
        out.push_str(&format_one(verb, value, index, &spec)?);
        check_text_len(out.len())?;
    }
    Ok(Value::string(out))
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut n: Option<usize> = None;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        n = Some(n.unwrap_or(0).saturating_mul(10).saturating_add(d as usize));
    }
    // Widths beyond the text limit can only fail later.
    n.map(|n| n.min(super::helpers::MAX_TEXT_LEN))
}

fn format_one(verb: char, value: &Value, index: usize, spec: &Spec) -> Result<String, FnError> {
    let int = || {
        value
            .as_int()
            .ok_or_else(|| wrong_arg_type(index, "an integer", value))
    };
    let float = || {
        value
            .as_f64()
            .ok_or_else(|| wrong_arg_type(index, "a number", value))
    };
    Ok(match verb {
        's' | 'v' => format_str(&text_value(value, index)?, spec),
        'q' => {
            let quoted = serde_json::to_string(&*text_value(value, index)?)
                .map_err(|e| invalid_argument(e.to_string()))?;
            format_str(&quoted, spec)
        }
        't' => format_str(if value.is_truthy() { "true" } else { "false" }, spec),
        'd' => format_int(int()?, 10, false, spec),
        'x' | 'X' if value.as_int().is_none() => match value.as_str() {
            Some(s) => {
                check_text_len(s.len().saturating_mul(2))?;
                format_str(&hex_bytes(s, verb == 'X'), spec)
            }
            None => format_int(int()?, 16, verb == 'X', spec),
        },
        'x' => format_int(int()?, 16, false, spec),
        'X' => format_int(int()?, 16, true, spec),
        'o' => format_int(int()?, 8, false, spec),
        'b' => format_int(int()?, 2, false, spec),
        'f' => format_float(float()?, false, spec),
        'e' => format_float(float()?, true, spec),
        other => return Err(invalid_argument(format!("unknown format verb %{other}"))),
    })
}

fn hex_bytes(s: &str, upper: bool) -> String {
    s.bytes()
        .map(|b| {
            if upper {
                format!("{b:02X}")
            } else {
                format!("{b:02x}")
            }
        })
        .collect()
}

fn format_sign(negative: bool, spec: &Spec) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

fn format_int(n: i64, radix: u32, upper: bool, spec: &Spec) -> String {
    let abs = n.unsigned_abs();
    let digits = match (radix, upper) {
        (16, true) => format!("{abs:X}"),
        (16, false) => format!("{abs:x}"),
        (8, _) => format!("{abs:o}"),
        (2, _) => format!("{abs:b}"),
        _ => format!("{abs}"),
    };
    pad_number(format_sign(n < 0, spec), &digits, spec)
}

fn format_float(f: f64, scientific: bool, spec: &Spec) -> String {
    let negative = f.is_sign_negative() && !f.is_nan() && f != 0.0;
    let abs = f.abs();
    let prec = spec.precision.unwrap_or(6);
    let digits = if scientific {
        format_scientific(abs, prec)
    } else {
        format!("{abs:.prec$}")
    };
    pad_number(format_sign(negative, spec), &digits, spec)
}

/// `1.500000e+03` form: at least two exponent digits, explicit sign.
fn format_scientific(f: f64, prec: usize) -> String {
    let raw = format!("{f:.prec$e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Zero padding goes between the sign and the digits.
fn pad_number(sign: &str, digits: &str, spec: &Spec) -> String {
    if spec.zero && !spec.left {
        if let Some(width) = spec.width {
            let pad = width.saturating_sub(sign.len());
            return format!("{sign}{digits:0>pad$}");
        }
    }
    apply_alignment(&format!("{sign}{digits}"), spec)
}

fn format_str(s: &str, spec: &Spec) -> String {
    match spec.precision {
        Some(prec) if s.chars().count() > prec => {
            apply_alignment(&s.chars().take(prec).collect::<String>(), spec)
        }
        _ => apply_alignment(s, spec),
    }
}

fn apply_alignment(s: &str, spec: &Spec) -> String {
    let Some(width) = spec.width else {
        return s.to_string();
    };
    if spec.left {
        format!("{s:<width$}")
    } else {
        format!("{s:>width$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn run(format: &str, args: Vec<Value>) -> String {
        let mut all = vec![Value::string(format)];
        all.extend(args);
        match printf(&all) {
            Ok(v) => v.to_output(),
            Err(e) => format!("error: {e}"),
        }
    }

    #[test_case("%d", Value::Int(42), "42"; "decimal")]
    #[test_case("%5d", Value::Int(42), "   42"; "width")]
    #[test_case("%-5d|", Value::Int(42), "42   |"; "left")]
    #[test_case("%05d", Value::Int(-42), "-0042"; "zero pad negative")]
    #[test_case("%+d", Value::Int(7), "+7"; "plus sign")]
    #[test_case("%x", Value::Int(255), "ff"; "hex")]
    #[test_case("%X", Value::Int(255), "FF"; "upper hex")]
    #[test_case("%o", Value::Int(8), "10"; "octal")]
    #[test_case("%b", Value::Int(5), "101"; "binary")]
    #[test_case("%.2f", Value::Float(3.14159), "3.14"; "precision")]
    #[test_case("%f", Value::Int(2), "2.000000"; "default precision")]
    #[test_case("%8.3f", Value::Float(-1.5), "  -1.500"; "float width")]
    #[test_case("%e", Value::Float(1500.0), "1.500000e+03"; "scientific")]
    #[test_case("%.1e", Value::Float(0.00012), "1.2e-04"; "negative exponent")]
    #[test_case("%s", Value::string("hi"), "hi"; "string")]
    #[test_case("%.3s", Value::string("abcdef"), "abc"; "string precision")]
    #[test_case("%6s", Value::string("ab"), "    ab"; "string right")]
    #[test_case("%v", Value::list(vec![Value::Int(1)]), "[1]"; "value")]
    #[test_case("%q", Value::string("a\"b"), r#""a\"b""#; "quoted")]
    #[test_case("%t", Value::Int(0), "false"; "truthiness")]
    #[test_case("%x", Value::string("hi"), "6869"; "hex string")]
    #[test_case("%d", Value::string("12"), "12"; "numeric string")]
    fn test_verbs(format: &str, value: Value, expected: &str) {
        assert_eq!(run(format, vec![value]), expected);
    }

    #[test]
    fn test_mixed_text() {
        assert_eq!(
            run(
                "%s scored %d (%.1f%%)",
                vec![Value::string("Nova"), Value::Int(9), Value::Float(90.0)]
            ),
            "Nova scored 9 (90.0%)"
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(run("%d", vec![]), "error: missing argument for %d");
        assert_eq!(
            run("%d", vec![Value::string("x")]),
            "error: argument 2 must be an integer, got string"
        );
        assert_eq!(run("%y", vec![Value::Int(1)]), "error: unknown format verb %y");
        assert_eq!(run("50%", vec![]), "error: format ends with an incomplete directive");
    }

    #[test]
    fn test_extra_arguments_ignored() {
        assert_eq!(run("%s", vec![Value::string("a"), Value::string("b")]), "a");
    }
}

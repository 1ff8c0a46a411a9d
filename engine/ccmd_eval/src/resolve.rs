//! Path resolution for `.Context.Path` and `$var.path` references.
//!
//! Resolution never fails: every miss is empty text. Resolved values keep
//! their native type so nested expressions receive numbers as numbers.

use ccmd_value::{traverse, Context, Value};
use tracing::trace;

use crate::config::JsonFallback;
use crate::vars::VariableTable;

/// Resolve a context path. Missing segments give empty text.
pub fn resolve_context(context: &Context, path: &[&str]) -> Value {
    context.lookup(path).unwrap_or_else(|| {
        trace!(path = %path.join("."), "context path missed");
        Value::empty_str()
    })
}

/// Resolve `$name.path`.
///
/// With no path the variable's value is returned as is. When a path is
/// applied to a variable holding a string, the string is parsed as JSON
/// under `fallback` first; a string that does not parse resolves to empty
/// text. [`JsonFallback::Permissive`] also parses strings met further along
/// the path.
pub fn resolve_variable(
    vars: &VariableTable,
    name: &str,
    path: &[&str],
    fallback: JsonFallback,
) -> Value {
    let Some(value) = vars.get(name) else {
        trace!(name, "unbound variable");
        return Value::empty_str();
    };
    let mut current = value.clone();
    for (depth, segment) in path.iter().enumerate() {
        // A permissive parse may yield another JSON document held as a string.
        let mut decode = depth == 0 || fallback == JsonFallback::Permissive;
        while decode {
            let Value::Str(text) = &current else {
                break;
            };
            let Some(parsed) = fallback.parse(text) else {
                trace!(name, depth, "variable text is not structured");
                return Value::empty_str();
            };
            current = parsed;
            decode = fallback == JsonFallback::Permissive;
        }
        let Some(next) = traverse(&current, std::slice::from_ref(segment)) else {
            trace!(name, path = %path.join("."), "variable path missed");
            return Value::empty_str();
        };
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> VariableTable {
        let mut vars = VariableTable::new();
        vars.assign("n", Value::Int(5));
        vars.assign(
            "m",
            Value::map_from([("a", Value::map_from([("b", Value::Int(1))]))]),
        );
        vars.assign("j", Value::string(r#"{"count": 3, "tags": ["x"]}"#));
        vars.assign("t", Value::string("plain"));
        vars
    }

    #[test]
    fn test_context_paths() {
        let ctx = Context::builder().field("User", "Username", "Nova").build();
        assert_eq!(resolve_context(&ctx, &["User", "Username"]), Value::string("Nova"));
        assert_eq!(resolve_context(&ctx, &["User", "Nope"]), Value::empty_str());
        assert_eq!(resolve_context(&ctx, &["Channel", "ID"]), Value::empty_str());
    }

    #[test]
    fn test_variable_paths() {
        let vars = table();
        let fallback = JsonFallback::Structured;
        assert_eq!(resolve_variable(&vars, "n", &[], fallback), Value::Int(5));
        assert_eq!(resolve_variable(&vars, "m", &["a", "b"], fallback), Value::Int(1));
        assert_eq!(resolve_variable(&vars, "m", &["z"], fallback), Value::empty_str());
        assert_eq!(resolve_variable(&vars, "missing", &[], fallback), Value::empty_str());
    }

    #[test]
    fn test_json_fallback() {
        let vars = table();
        let fallback = JsonFallback::Structured;
        assert_eq!(resolve_variable(&vars, "j", &["count"], fallback), Value::Int(3));
        assert_eq!(
            resolve_variable(&vars, "j", &["tags", "0"], fallback),
            Value::string("x")
        );
        assert_eq!(resolve_variable(&vars, "t", &["x"], fallback), Value::empty_str());
        assert_eq!(
            resolve_variable(&vars, "n", &["x"], JsonFallback::Permissive),
            Value::empty_str()
        );
    }

    #[test]
    fn test_permissive_fallback() {
        let mut vars = table();
        vars.assign("arr", Value::string("[1,2]"));
        vars.assign("quoted", Value::string(r#""[1,2]""#));
        vars.assign("num", Value::string("123"));
        vars.assign(
            "nested",
            Value::map_from([("inner", Value::string(r#"{"b": 7}"#))]),
        );
        for fallback in [JsonFallback::Structured, JsonFallback::Permissive] {
            assert_eq!(resolve_variable(&vars, "arr", &["0"], fallback), Value::Int(1));
            assert_eq!(resolve_variable(&vars, "num", &["0"], fallback), Value::empty_str());
            assert_eq!(resolve_variable(&vars, "quoted", &[], fallback), Value::string(r#""[1,2]""#));
        }
        assert_eq!(
            resolve_variable(&vars, "quoted", &["1"], JsonFallback::Structured),
            Value::empty_str()
        );
        assert_eq!(
            resolve_variable(&vars, "quoted", &["1"], JsonFallback::Permissive),
            Value::Int(2)
        );
        assert_eq!(
            resolve_variable(&vars, "nested", &["inner", "b"], JsonFallback::Structured),
            Value::empty_str()
        );
        assert_eq!(
            resolve_variable(&vars, "nested", &["inner", "b"], JsonFallback::Permissive),
            Value::Int(7)
        );
    }
}

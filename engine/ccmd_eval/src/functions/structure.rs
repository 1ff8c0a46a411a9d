//! Structured values: mappings, lists, embeds and JSON.
//!
//! `addField` and `setKey` are registered with
//! [`WriteBack::FirstArgument`]: `{{ addField $e "n" "v" }}` updates `$e`
//! in place and renders nothing.

use ccmd_value::{Map, Value};

use super::helpers::{arg, check_list_len, require_map, text_arg, MAX_TEXT_LEN};
use crate::errors::{invalid_argument, wrong_arg_type, FnError, FnResult};
use crate::registry::{Arity, FunctionDescriptor, FunctionRegistry, WriteBack};

/// Keys an embed may carry.
pub const EMBED_KEYS: &[&str] = &[
    "author",
    "color",
    "description",
    "fields",
    "footer",
    "image",
    "thumbnail",
    "timestamp",
    "title",
    "url",
];

/// Most fields one embed may hold.
pub const MAX_EMBED_FIELDS: usize = 25;

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register_pure("dict", Arity::AtLeast(0), dict);
    registry.register_pure("list", Arity::AtLeast(0), list);
    registry.register_pure("embed", Arity::AtLeast(0), embed);
    registry.register(
        FunctionDescriptor::pure("addField", Arity::Between(3, 4), add_field)
            .with_write_back(WriteBack::FirstArgument),
    );
    registry.register(
        FunctionDescriptor::pure("setKey", Arity::Exact(3), set_key)
            .with_write_back(WriteBack::FirstArgument),
    );
    registry.register_pure("json", Arity::Exact(1), json);
    registry.register_pure("parseJSON", Arity::Exact(1), parse_json);
}

/// Build a map from alternating key and value arguments.
fn pairs(args: &[Value]) -> Result<Map, FnError> {
    if args.len() % 2 != 0 {
        return Err(invalid_argument("expected key/value pairs"));
    }
    let mut map = Map::new();
    for (i, pair) in args.chunks_exact(2).enumerate() {
        let key = match &pair[0] {
            Value::Str(s) => s.to_string(),
            Value::Int(n) => n.to_string(),
            other => return Err(wrong_arg_type(i * 2, "a string key", other)),
        };
        map.insert(key, pair[1].clone());
    }
    Ok(map)
}

fn dict(args: &[Value]) -> FnResult {
    Ok(Value::map(pairs(args)?))
}

fn list(args: &[Value]) -> FnResult {
    check_list_len(args.len())?;
    Ok(Value::list(args.to_vec()))
}

/// Like `dict`, but only embed keys are allowed, `color` may be given as
/// `#rrggbb`, and `fields` always exists.
fn embed(args: &[Value]) -> FnResult {
    let mut map = pairs(args)?;
    if let Some(unknown) = map.keys().find(|k| !EMBED_KEYS.contains(&k.as_str())) {
        return Err(invalid_argument(format!("`{unknown}` is not an embed key")));
    }
    if let Some(color) = map.get_mut("color") {
        *color = parse_color(color)?;
    }
    match map.get("fields") {
        None => {
            map.insert("fields".to_string(), Value::list(Vec::new()));
        }
        Some(Value::List(fields)) if fields.len() <= MAX_EMBED_FIELDS => {}
        Some(Value::List(_)) => {
            return Err(invalid_argument(format!(
                "an embed holds at most {MAX_EMBED_FIELDS} fields"
            )));
        }
        Some(other) => {
            return Err(invalid_argument(format!(
                "fields must be a list, got {}",
                other.type_name()
            )));
        }
    }
    Ok(Value::map(map))
}

fn parse_color(value: &Value) -> FnResult {
    match value {
        Value::Int(n) if (0..=0xFF_FFFF).contains(n) => Ok(Value::Int(*n)),
        Value::Str(s) => {
            let hex = s.trim().trim_start_matches('#');
            i64::from_str_radix(hex, 16)
                .ok()
                .filter(|n| hex.len() <= 6 && (0..=0xFF_FFFF).contains(n))
                .map(Value::Int)
                .ok_or_else(|| invalid_argument(format!("`{}` is not a color", s.as_str())))
        }
        other => Err(invalid_argument(format!("{} is not a color", other.type_name()))),
    }
}

/// `addField embed name value [inline]` appends to the embed's fields.
fn add_field(args: &[Value]) -> FnResult {
    let mut map = require_map(args, 0)?.into_owned();
    let field = Value::map_from([
        ("name", Value::string(text_arg(args, 1)?)),
        ("value", Value::string(text_arg(args, 2)?)),
        ("inline", Value::Bool(arg(args, 3).is_truthy())),
    ]);
    let fields = map
        .entry("fields".to_string())
        .or_insert_with(|| Value::list(Vec::new()));
    let Value::List(items) = fields else {
        return Err(invalid_argument("fields must be a list"));
    };
    if items.len() >= MAX_EMBED_FIELDS {
        return Err(invalid_argument(format!(
            "an embed holds at most {MAX_EMBED_FIELDS} fields"
        )));
    }
    items.make_mut().push(field);
    Ok(Value::map(map))
}

/// `setKey map key value` returns the map with `key` set.
fn set_key(args: &[Value]) -> FnResult {
    let mut map = require_map(args, 0)?.into_owned();
    map.insert(text_arg(args, 1)?.into_owned(), arg(args, 2).clone());
    Ok(Value::map(map))
}

/// Serialize to JSON text. Strings become quoted JSON strings.
fn json(args: &[Value]) -> FnResult {
    arg(args, 0)
        .render_json(MAX_TEXT_LEN)
        .map(Value::string)
        .map_err(|_| invalid_argument(format!("JSON would be longer than {MAX_TEXT_LEN} bytes")))
}

fn parse_json(args: &[Value]) -> FnResult {
    let text = text_arg(args, 0)?;
    serde_json::from_str::<serde_json::Value>(&text)
        .map(Value::from_json)
        .map_err(|e| invalid_argument(format!("invalid JSON: {e}")))
}

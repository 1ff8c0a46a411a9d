//! Built-in functions.
//!
//! Each group module registers its functions with [`register_builtins`].
//! Pure functions are plain `fn(&[Value]) -> FnResult`; effecting ones
//! implement [`EffectingFunction`](crate::registry::EffectingFunction) and
//! reach the host through the call context.

mod collections;
mod format;
pub mod helpers;
mod logic;
mod math;
mod platform;
mod random;
mod storage;
mod string;
mod structure;

pub use structure::{EMBED_KEYS, MAX_EMBED_FIELDS};

use crate::registry::FunctionRegistry;

/// Every built-in function name, sorted.
///
/// Used by consistency tests to check that registration and documentation
/// agree on which functions exist.
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "abs",
    "add",
    "addField",
    "addRole",
    "and",
    "ceil",
    "dbCount",
    "dbDel",
    "dbExists",
    "dbGet",
    "dbQuery",
    "dbSet",
    "dict",
    "div",
    "embed",
    "eq",
    "fdiv",
    "floor",
    "ge",
    "getMember",
    "gt",
    "hasPermission",
    "hasPrefix",
    "hasRole",
    "hasSuffix",
    "if",
    "in",
    "index",
    "joinStr",
    "json",
    "le",
    "len",
    "list",
    "lower",
    "lt",
    "max",
    "min",
    "mod",
    "mult",
    "ne",
    "not",
    "or",
    "parseJSON",
    "pow",
    "print",
    "printf",
    "randInt",
    "reFind",
    "reFindAll",
    "reMatch",
    "reReplace",
    "removeRole",
    "repeat",
    "replace",
    "round",
    "sendDM",
    "sendMessage",
    "seq",
    "setKey",
    "setNickname",
    "shuffle",
    "slice",
    "sort",
    "split",
    "str",
    "sub",
    "title",
    "toFloat",
    "toInt",
    "trim",
    "trimPrefix",
    "trimSuffix",
    "upper",
];

/// Register every built-in function group.
pub fn register_builtins(registry: &mut FunctionRegistry) {
    string::register(registry);
    math::register(registry);
    logic::register(registry);
    collections::register(registry);
    structure::register(registry);
    platform::register(registry);
    storage::register(registry);
}

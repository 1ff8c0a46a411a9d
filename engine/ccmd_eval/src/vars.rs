//! Per-evaluation variable table.

use ccmd_value::Value;
use rustc_hash::FxHashMap;

/// Variables bound by `$name := ...` during one evaluation.
///
/// Flat: every directive sees one scope, and a binding is visible only to
/// directives after the one that made it.
#[derive(Clone, Debug, Default)]
pub struct VariableTable {
    bindings: FxHashMap<String, Value>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind or rebind `name`.
    pub fn assign(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.bindings.get_mut(name) {
            *slot = value;
        } else {
            self.bindings.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

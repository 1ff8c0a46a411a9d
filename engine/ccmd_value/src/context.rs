//! Invocation context.
//!
//! The context is built once per evaluation from the triggering event and is
//! never mutated afterwards. It is a map of named groups (`User`, `Channel`,
//! ...) each holding scalar fields and, occasionally, nested groups.

use std::collections::BTreeMap;

use crate::heap::Heap;
use crate::path::traverse;
use crate::value::{Map, Value};

/// Well-known top-level group names.
pub mod groups {
    pub const USER: &str = "User";
    pub const MEMBER: &str = "Member";
    pub const CHANNEL: &str = "Channel";
    pub const GUILD: &str = "Guild";
    pub const MESSAGE: &str = "Message";
    pub const ARGS: &str = "Args";
    pub const INTERACTION: &str = "Interaction";

    /// Groups that must be mappings when present.
    pub const MAPPING_GROUPS: &[&str] = &[USER, MEMBER, CHANNEL, GUILD, MESSAGE, INTERACTION];
}

/// A context that cannot be used for evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("context is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("context root must be a mapping, found {found}")]
    RootNotMapping { found: &'static str },
    #[error("context group `{group}` must be a {expected}, found {found}")]
    MalformedGroup {
        group: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Read-only invocation data.
#[derive(Clone, Debug, PartialEq)]
pub struct Context {
    root: Value,
}

impl Context {
    /// An empty context. Every path resolves to empty text.
    pub fn empty() -> Self {
        Context {
            root: Value::map(Map::new()),
        }
    }

    /// Start building a context group by group.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// Build a context from JSON, validating the well-known groups.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ContextError> {
        let root = Value::from_json(json);
        let Value::Map(entries) = &root else {
            return Err(ContextError::RootNotMapping {
                found: root.type_name(),
            });
        };
        validate_groups(entries)?;
        Ok(Context { root })
    }

    /// Parse a context from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ContextError> {
        Self::from_json(serde_json::from_str(text)?)
    }

    /// The whole tree as a map value.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// A top-level group by name.
    pub fn group(&self, name: &str) -> Option<&Value> {
        match &self.root {
            Value::Map(entries) => entries.get(name),
            _ => None,
        }
    }

    /// Look up a dotted path, `None` on any miss.
    pub fn lookup(&self, path: &[&str]) -> Option<Value> {
        traverse(&self.root, path)
    }

    /// Look up a path and view it as an identifier string.
    ///
    /// Numeric identifiers are accepted and rendered as text.
    pub fn lookup_id(&self, path: &[&str]) -> Option<String> {
        match self.lookup(path)? {
            Value::Str(s) if !s.is_empty() => Some(s.to_string()),
            Value::Int(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// A copy of this context with `Args` set to `args`, unless the
    /// context already defines an `Args` group.
    pub fn with_args(&self, args: &[String]) -> Context {
        if self.group(groups::ARGS).is_some() {
            return self.clone();
        }
        let Value::Map(entries) = &self.root else {
            return self.clone();
        };
        let mut entries: Heap<Map> = entries.clone();
        entries.make_mut().insert(
            groups::ARGS.to_string(),
            Value::list(args.iter().map(|a| Value::string(a.as_str())).collect()),
        );
        Context {
            root: Value::Map(entries),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::empty()
    }
}

fn validate_groups(entries: &Map) -> Result<(), ContextError> {
    for (name, value) in entries {
        let expected = if groups::MAPPING_GROUPS.contains(&name.as_str()) {
            if matches!(value, Value::Map(_) | Value::Null) {
                continue;
            }
            "mapping"
        } else if name == groups::ARGS {
            if matches!(value, Value::List(_) | Value::Null) {
                continue;
            }
            "list"
        } else {
            continue;
        };
        return Err(ContextError::MalformedGroup {
            group: name.clone(),
            expected,
            found: value.type_name(),
        });
    }
    Ok(())
}

/// Incremental context construction.
#[derive(Debug, Default)]
pub struct ContextBuilder {
    groups: BTreeMap<String, Map>,
    args: Option<Vec<Value>>,
}

impl ContextBuilder {
    /// Set `group.key = value`, creating the group if needed.
    #[must_use]
    pub fn field(mut self, group: &str, key: &str, value: impl Into<Value>) -> Self {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
        self
    }

    /// Set the `Args` group.
    #[must_use]
    pub fn args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args = Some(args.into_iter().map(Value::string).collect());
        self
    }

    pub fn build(self) -> Context {
        let mut root: Map = self
            .groups
            .into_iter()
            .map(|(name, fields)| (name, Value::map(fields)))
            .collect();
        if let Some(args) = self.args {
            root.insert(groups::ARGS.to_string(), Value::list(args));
        }
        Context {
            root: Value::map(root),
        }
    }
}

//! Host collaborators.
//!
//! The engine never talks to a chat platform or a database directly. It is
//! handed a [`Platform`] and a [`Store`] at construction and reaches them
//! only through effecting functions. Both traits are async so hosts can do
//! network I/O; in-memory implementations live in `ccmd_host`.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use ccmd_value::{Map, Value};
use serde::Deserialize;

/// Failure reported by a host collaborator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("timed out")]
    Timeout,
    #[error("{0} is not available")]
    Unavailable(&'static str),
}

pub type HostResult<T> = Result<T, HostError>;

/// A guild member as seen by the platform.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Member {
    pub id: String,
    pub username: String,
    pub nickname: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub bot: bool,
}

impl Member {
    /// Permission that implies every other permission.
    pub const ADMINISTRATOR: &'static str = "Administrator";

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Case-insensitive permission check. Administrators have everything.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| {
            p.eq_ignore_ascii_case(permission) || p.eq_ignore_ascii_case(Self::ADMINISTRATOR)
        })
    }

    /// The member as a template value, keyed like the `Member` context group.
    pub fn to_value(&self) -> Value {
        let strings = |items: &[String]| {
            Value::list(items.iter().map(|s| Value::string(s.as_str())).collect())
        };
        Value::map_from([
            ("ID", Value::string(self.id.as_str())),
            ("Username", Value::string(self.username.as_str())),
            (
                "Nickname",
                self.nickname
                    .as_deref()
                    .map_or_else(Value::empty_str, Value::string),
            ),
            ("Roles", strings(&self.roles)),
            ("Permissions", strings(&self.permissions)),
            ("Bot", Value::Bool(self.bot)),
        ])
    }
}

/// Body of an outgoing message.
#[derive(Clone, Debug, PartialEq)]
pub enum MessageContent {
    Text(String),
    /// A structured embed, as built by `embed`.
    Embed(Value),
}

/// Chat platform operations available to effecting functions.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn resolve_member(&self, id: &str) -> HostResult<Option<Member>>;

    async fn set_nickname(&self, member: &str, nickname: &str) -> HostResult<()>;

    async fn add_role(&self, member: &str, role: &str) -> HostResult<()>;

    async fn remove_role(&self, member: &str, role: &str) -> HostResult<()>;

    /// Send to a channel. Returns the new message's identifier.
    async fn send_message(&self, channel: &str, content: MessageContent) -> HostResult<String>;

    async fn send_direct_message(&self, user: &str, content: MessageContent) -> HostResult<()>;
}

/// Declared type of a registry entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    String,
    Number,
    Bool,
    Json,
}

/// Longest rendering a stored entry may have.
pub const MAX_ENTRY_LEN: usize = 100_000;

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::String => "string",
            EntryType::Number => "number",
            EntryType::Bool => "bool",
            EntryType::Json => "json",
        }
    }

    /// Convert `value` to this type, or `None` if it cannot be represented
    /// within [`MAX_ENTRY_LEN`] bytes.
    pub fn coerce(self, value: &Value) -> Option<Value> {
        match self {
            EntryType::String => value.render(MAX_ENTRY_LEN).ok().map(Value::string),
            EntryType::Number => match value.as_int() {
                Some(n) => Some(Value::Int(n)),
                None => value.as_f64().map(Value::Float),
            },
            EntryType::Bool => match value {
                Value::Bool(b) => Some(Value::Bool(*b)),
                Value::Str(s) => match s.trim() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    _ => None,
                },
                Value::Int(n) => Some(Value::Bool(*n != 0)),
                _ => None,
            },
            EntryType::Json => match value {
                Value::Str(s) => Value::parse_json(s),
                other => other
                    .render_json(MAX_ENTRY_LEN)
                    .ok()
                    .map(|_| other.clone()),
            },
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "text" => Ok(EntryType::String),
            "number" | "int" | "float" => Ok(EntryType::Number),
            "bool" | "boolean" => Ok(EntryType::Bool),
            "json" => Ok(EntryType::Json),
            other => Err(format!("unknown entry type `{other}`")),
        }
    }
}

/// One row returned by a structured query.
pub type Row = Map;

/// A whitelisted structured query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Query<'a> {
    pub table: &'a str,
    /// Column equality filters, all of which must match.
    pub filters: &'a [(String, Value)],
    pub limit: usize,
}

/// Key-value registry and structured query backend.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str, ty: EntryType) -> HostResult<Option<Value>>;

    async fn set(
        &self,
        key: &str,
        ty: EntryType,
        value: Value,
        description: &str,
    ) -> HostResult<()>;

    /// Remove an entry. Returns whether it existed.
    async fn delete(&self, key: &str, ty: EntryType) -> HostResult<bool>;

    async fn query(&self, query: Query<'_>) -> HostResult<Vec<Row>>;
}

/// A host with no platform and no store. Every effecting call fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unavailable;

#[async_trait]
impl Platform for Unavailable {
    async fn resolve_member(&self, _id: &str) -> HostResult<Option<Member>> {
        Err(HostError::Unavailable("platform"))
    }

    async fn set_nickname(&self, _member: &str, _nickname: &str) -> HostResult<()> {
        Err(HostError::Unavailable("platform"))
    }

    async fn add_role(&self, _member: &str, _role: &str) -> HostResult<()> {
        Err(HostError::Unavailable("platform"))
    }

    async fn remove_role(&self, _member: &str, _role: &str) -> HostResult<()> {
        Err(HostError::Unavailable("platform"))
    }

    async fn send_message(&self, _channel: &str, _content: MessageContent) -> HostResult<String> {
        Err(HostError::Unavailable("platform"))
    }

    async fn send_direct_message(&self, _user: &str, _content: MessageContent) -> HostResult<()> {
        Err(HostError::Unavailable("platform"))
    }
}

#[async_trait]
impl Store for Unavailable {
    async fn get(&self, _key: &str, _ty: EntryType) -> HostResult<Option<Value>> {
        Err(HostError::Unavailable("store"))
    }

    async fn set(
        &self,
        _key: &str,
        _ty: EntryType,
        _value: Value,
        _description: &str,
    ) -> HostResult<()> {
        Err(HostError::Unavailable("store"))
    }

    async fn delete(&self, _key: &str, _ty: EntryType) -> HostResult<bool> {
        Err(HostError::Unavailable("store"))
    }

    async fn query(&self, _query: Query<'_>) -> HostResult<Vec<Row>> {
        Err(HostError::Unavailable("store"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("string", EntryType::String; "string")]
    #[test_case("TEXT", EntryType::String; "text alias")]
    #[test_case("int", EntryType::Number; "int alias")]
    #[test_case("boolean", EntryType::Bool; "boolean alias")]
    #[test_case(" json ", EntryType::Json; "padded json")]
    fn test_entry_type_names(name: &str, expected: EntryType) {
        assert_eq!(name.parse::<EntryType>(), Ok(expected));
    }

    #[test]
    fn test_entry_type_unknown() {
        assert!("blob".parse::<EntryType>().is_err());
    }

    #[test]
    fn test_coerce() {
        assert_eq!(
            EntryType::Number.coerce(&Value::string("12")),
            Some(Value::Int(12))
        );
        assert_eq!(
            EntryType::Number.coerce(&Value::string("1.5")),
            Some(Value::Float(1.5))
        );
        assert_eq!(EntryType::Number.coerce(&Value::string("abc")), None);
        assert_eq!(
            EntryType::String.coerce(&Value::Int(3)),
            Some(Value::string("3"))
        );
        assert_eq!(EntryType::Bool.coerce(&Value::string("maybe")), None);
        assert_eq!(
            EntryType::Json.coerce(&Value::string("[1]")),
            Some(Value::list(vec![Value::Int(1)]))
        );
    }

    #[test]
    fn test_coerce_refuses_oversized_values() {
        let mut value = Value::string("ab");
        for _ in 0..40 {
            value = Value::list(vec![value.clone(), value]);
        }
        assert_eq!(EntryType::String.coerce(&value), None);
        assert_eq!(EntryType::Json.coerce(&value), None);
        let small = Value::list(vec![Value::Int(1)]);
        assert_eq!(EntryType::Json.coerce(&small), Some(small.clone()));
    }

    #[test]
    fn test_member_permissions() {
        let member = Member {
            id: "1".into(),
            permissions: vec!["ManageRoles".into()],
            ..Member::default()
        };
        assert!(member.has_permission("manageroles"));
        assert!(!member.has_permission("BanMembers"));
        let admin = Member {
            permissions: vec!["Administrator".into()],
            ..Member::default()
        };
        assert!(admin.has_permission("BanMembers"));
    }

    #[test]
    fn test_member_value_nickname_defaults_to_empty() {
        let member = Member {
            id: "7".into(),
            username: "nova".into(),
            ..Member::default()
        };
        let value = member.to_value();
        assert_eq!(
            ccmd_value::traverse(&value, &["Nickname"]),
            Some(Value::empty_str())
        );
    }
}

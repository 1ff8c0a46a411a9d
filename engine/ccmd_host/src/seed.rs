//! JSON seed for the in-memory hosts.
//!
//! ```json
//! {
//!   "members": [{"id": "42", "username": "nova", "permissions": ["ManageRoles"]}],
//!   "entries": [{"key": "score", "type": "number", "value": 10}],
//!   "tables": {"scores": [{"user": "42", "points": 10}]}
//! }
//! ```
//!
//! Every section is optional.

use std::collections::BTreeMap;

use ccmd_eval::{EntryType, Member, Row};
use ccmd_value::Value;
use serde::Deserialize;

use crate::platform::MemoryPlatform;
use crate::store::MemoryStore;

/// A seed that could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entry `{key}`: {value} cannot be stored as {ty}")]
    Coerce {
        key: String,
        ty: EntryType,
        value: String,
    },
    #[error("table `{table}`: row {index} is not an object")]
    MalformedRow { table: String, index: usize },
}

/// One registry entry in a seed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EntrySeed {
    pub key: String,
    #[serde(rename = "type", default)]
    pub ty: EntryType,
    pub value: serde_json::Value,
    #[serde(default)]
    pub description: String,
}

/// Initial state for a [`MemoryPlatform`] and a [`MemoryStore`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub members: Vec<Member>,
    pub entries: Vec<EntrySeed>,
    pub tables: BTreeMap<String, Vec<serde_json::Value>>,
}

impl Seed {
    pub fn from_json_str(text: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build both hosts. Entry values are coerced to their declared type.
    pub fn into_hosts(self) -> Result<(MemoryPlatform, MemoryStore), SeedError> {
        let platform = MemoryPlatform::new();
        for member in self.members {
            platform.insert_member(member);
        }

        let store = MemoryStore::new();
        for entry in self.entries {
            let raw = Value::from_json(entry.value);
            let Some(value) = entry.ty.coerce(&raw) else {
                return Err(SeedError::Coerce {
                    key: entry.key,
                    ty: entry.ty,
                    value: raw.to_output(),
                });
            };
            store.insert_entry(&entry.key, entry.ty, value, &entry.description);
        }
        for (table, rows) in self.tables {
            let rows = rows
                .into_iter()
                .enumerate()
                .map(|(index, row)| match Value::from_json(row) {
                    Value::Map(fields) => Ok(fields.into_inner()),
                    _ => Err(SeedError::MalformedRow {
                        table: table.clone(),
                        index,
                    }),
                })
                .collect::<Result<Vec<Row>, _>>()?;
            store.insert_rows(&table, rows);
        }

        tracing::debug!(
            members = platform.member_count(),
            entries = store.entry_count(),
            "seed loaded"
        );
        Ok((platform, store))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_seed() {
        let (platform, store) = Seed::from_json_str("{}").unwrap().into_hosts().unwrap();
        assert_eq!(platform.member_count(), 0);
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn test_entries_are_coerced() {
        let seed = Seed::from_json_str(
            r#"{"entries": [
                {"key": "n", "type": "number", "value": "12"},
                {"key": "s", "value": 3, "description": "count"}
            ]}"#,
        )
        .unwrap();
        let (_, store) = seed.into_hosts().unwrap();
        assert_eq!(
            store.entry("n", EntryType::Number).unwrap().value,
            Value::Int(12)
        );
        let s = store.entry("s", EntryType::String).unwrap();
        assert_eq!(s.value, Value::string("3"));
        assert_eq!(s.description, "count");
    }

    #[test]
    fn test_uncoercible_entry() {
        let seed = Seed::from_json_str(
            r#"{"entries": [{"key": "n", "type": "number", "value": "lots"}]}"#,
        )
        .unwrap();
        let err = seed.into_hosts().unwrap_err();
        assert_eq!(err.to_string(), "entry `n`: lots cannot be stored as number");
    }

    #[test]
    fn test_rows_must_be_objects() {
        let seed = Seed::from_json_str(r#"{"tables": {"t": [{"a": 1}, 2]}}"#).unwrap();
        assert!(matches!(
            seed.into_hosts(),
            Err(SeedError::MalformedRow { index: 1, .. })
        ));
    }

    #[test]
    fn test_member_fields_default() {
        let seed = Seed::from_json_str(r#"{"members": [{"id": "1"}]}"#).unwrap();
        let (platform, _) = seed.into_hosts().unwrap();
        let member = platform.member("1").unwrap();
        assert_eq!(member.username, "");
        assert!(!member.bot);
    }

    #[test]
    fn test_unknown_entry_type_is_rejected() {
        let err = Seed::from_json_str(r#"{"entries": [{"key": "k", "type": "blob", "value": 1}]}"#)
            .unwrap_err();
        assert!(matches!(err, SeedError::Json(_)));
    }
}

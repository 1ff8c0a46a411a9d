//! In-memory registry and query tables.

use std::collections::BTreeMap;

use async_trait::async_trait;
use ccmd_eval::{EntryType, HostResult, Query, Row, Store, MAX_ENTRY_LEN};
use ccmd_value::Value;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::trace;

/// A stored registry entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub value: Value,
    pub description: String,
}

/// A store holding key-value entries and read-only query tables.
///
/// Entries are keyed by `(key, type)`, so `score` as a number and `score`
/// as a string are distinct. Tables are only read by templates; the host
/// loads them up front with [`MemoryStore::insert_rows`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<(String, EntryType), Entry>,
    tables: RwLock<BTreeMap<String, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look at an entry without going through the async trait.
    pub fn entry(&self, key: &str, ty: EntryType) -> Option<Entry> {
        self.entries
            .get(&(key.to_string(), ty))
            .map(|e| e.value().clone())
    }

    pub fn insert_entry(&self, key: &str, ty: EntryType, value: Value, description: &str) {
        self.entries.insert(
            (key.to_string(), ty),
            Entry {
                value,
                description: description.to_string(),
            },
        );
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Append rows to `table`, creating it if needed.
    pub fn insert_rows(&self, table: &str, rows: impl IntoIterator<Item = Row>) {
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    #[must_use]
    pub fn with_rows(self, table: &str, rows: impl IntoIterator<Item = Row>) -> Self {
        self.insert_rows(table, rows);
        self
    }

    pub fn table_len(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, Vec::len)
    }
}

fn matches(row: &Row, filters: &[(String, Value)]) -> bool {
    filters.iter().all(|(column, wanted)| {
        row.get(column)
            .is_some_and(|found| found == wanted || same_text(found, wanted))
    })
}

/// Whether both values render to the same text. `wanted` comes from a
/// template, so it is rendered no further than `found`'s length.
fn same_text(found: &Value, wanted: &Value) -> bool {
    let Ok(text) = found.render(MAX_ENTRY_LEN) else {
        return false;
    };
    wanted.render(text.len()).is_ok_and(|w| w == text)
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str, ty: EntryType) -> HostResult<Option<Value>> {
        Ok(self.entry(key, ty).map(|e| e.value))
    }

    async fn set(
        &self,
        key: &str,
        ty: EntryType,
        value: Value,
        description: &str,
    ) -> HostResult<()> {
        trace!(key, %ty, "store set");
        self.insert_entry(key, ty, value, description);
        Ok(())
    }

    async fn delete(&self, key: &str, ty: EntryType) -> HostResult<bool> {
        Ok(self.entries.remove(&(key.to_string(), ty)).is_some())
    }

    /// Rows of an unknown table are simply empty.
    async fn query(&self, query: Query<'_>) -> HostResult<Vec<Row>> {
        let tables = self.tables.read();
        let Some(rows) = tables.get(query.table) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .filter(|row| matches(row, query.filters))
            .take(query.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn score(user: &str, points: i64) -> Row {
        Row::from([
            ("user".to_string(), Value::string(user)),
            ("points".to_string(), Value::Int(points)),
        ])
    }

    #[tokio::test]
    async fn test_entries_are_keyed_by_type() {
        let store = MemoryStore::new();
        store
            .set("score", EntryType::Number, Value::Int(3), "")
            .await
            .unwrap();
        assert_eq!(store.get("score", EntryType::String).await.unwrap(), None);
        assert_eq!(
            store.get("score", EntryType::Number).await.unwrap(),
            Some(Value::Int(3))
        );
        assert!(store.delete("score", EntryType::Number).await.unwrap());
        assert!(!store.delete("score", EntryType::Number).await.unwrap());
    }

    #[tokio::test]
    async fn test_description_is_kept() {
        let store = MemoryStore::new();
        store
            .set("motd", EntryType::String, Value::string("hi"), "greeting")
            .await
            .unwrap();
        assert_eq!(store.entry("motd", EntryType::String).unwrap().description, "greeting");
    }

    #[tokio::test]
    async fn test_query_filters_and_limits() {
        let store = MemoryStore::new().with_rows(
            "scores",
            [score("1", 5), score("2", 7), score("1", 9)],
        );
        let filters = vec![("user".to_string(), Value::string("1"))];
        let rows = store
            .query(Query {
                table: "scores",
                filters: &filters,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(rows, vec![score("1", 5), score("1", 9)]);

        let rows = store
            .query(Query {
                table: "scores",
                filters: &[],
                limit: 1,
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_filter_compares_rendered_text() {
        let store = MemoryStore::new().with_rows("scores", [score("1", 5)]);
        let filters = vec![("points".to_string(), Value::string("5"))];
        let rows = store
            .query(Query {
                table: "scores",
                filters: &filters,
                limit: 5,
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_filter_does_not_render_oversized_values() {
        let store = MemoryStore::new().with_rows("scores", [score("1", 5)]);
        let mut wanted = Value::string("5");
        for _ in 0..40 {
            wanted = Value::list(vec![wanted.clone(), wanted]);
        }
        let filters = vec![("points".to_string(), wanted)];
        let rows = store
            .query(Query {
                table: "scores",
                filters: &filters,
                limit: 5,
            })
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_table_is_empty() {
        let store = MemoryStore::new();
        let rows = store
            .query(Query {
                table: "nope",
                filters: &[],
                limit: 5,
            })
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}

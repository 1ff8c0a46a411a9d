//! Engine configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. Quotas bound the work a single evaluation may do; the query
//! policy is the whitelist for `dbQuery` and friends.

use std::collections::BTreeMap;
use std::time::Duration;

use ccmd_value::Value;
use serde::Deserialize;

/// Default cap on template length in bytes.
pub const DEFAULT_MAX_TEMPLATE_LEN: usize = 64 * 1024;
/// Default cap on directives evaluated per template.
pub const DEFAULT_MAX_DIRECTIVES: usize = 500;
/// Default cap on nested expression depth.
pub const DEFAULT_MAX_DEPTH: usize = 16;
/// Default cap on effecting calls per evaluation.
pub const DEFAULT_MAX_EFFECT_CALLS: usize = 50;
/// Default cap on rendered output length in bytes.
pub const DEFAULT_MAX_OUTPUT_LEN: usize = 1024 * 1024;

/// How a string stored in a variable is treated when a property path is
/// applied to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonFallback {
    /// Parse only strings that look like a JSON object or array.
    #[default]
    Structured,
    /// Parse any string that is valid JSON, including strings reached
    /// part way along a path.
    Permissive,
}

impl JsonFallback {
    /// Parse `text` under this policy.
    pub fn parse(self, text: &str) -> Option<Value> {
        if self == JsonFallback::Structured {
            let trimmed = text.trim_start();
            if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                return None;
            }
        }
        Value::parse_json(text)
    }
}

/// Whitelist for structured registry queries.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryPolicy {
    /// Queryable tables and, for each, the columns that may be filtered on
    /// and returned.
    pub tables: BTreeMap<String, Vec<String>>,
    /// Upper bound on rows returned by one query.
    pub max_rows: usize,
    /// Time allowed for one query before it is abandoned.
    pub query_timeout_ms: u64,
}

impl QueryPolicy {
    /// Allow `table` with the given columns.
    #[must_use]
    pub fn with_table<I, S>(mut self, table: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables.insert(
            table.to_string(),
            columns.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Columns allowed on `table`, or `None` if the table is not queryable.
    pub fn allowed_columns(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    /// Clamp a requested row count to `max_rows`.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested.map_or(self.max_rows, |n| n.min(self.max_rows))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for QueryPolicy {
    fn default() -> Self {
        QueryPolicy {
            tables: BTreeMap::new(),
            max_rows: 25,
            query_timeout_ms: 2000,
        }
    }
}

/// Engine-wide settings shared by every evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_template_len: usize,
    pub max_directives: usize,
    pub max_depth: usize,
    pub max_effect_calls: usize,
    pub max_output_len: usize,
    pub json_fallback: JsonFallback,
    pub query: QueryPolicy,
}

impl EngineConfig {
    /// Parse a configuration from JSON text. Missing fields take defaults.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_template_len: DEFAULT_MAX_TEMPLATE_LEN,
            max_directives: DEFAULT_MAX_DIRECTIVES,
            max_depth: DEFAULT_MAX_DEPTH,
            max_effect_calls: DEFAULT_MAX_EFFECT_CALLS,
            max_output_len: DEFAULT_MAX_OUTPUT_LEN,
            json_fallback: JsonFallback::default(),
            query: QueryPolicy::default(),
        }
    }
}

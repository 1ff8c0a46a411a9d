//! Registry functions: typed key-value entries and whitelisted queries.
//!
//! Queries only reach tables and columns named in the engine's
//! [`QueryPolicy`](crate::config::QueryPolicy). Row counts are clamped to
//! `max_rows` and every query runs under `query_timeout_ms`.

use async_trait::async_trait;
use ccmd_value::{Map, Value};

use super::helpers::{arg, len_to_value, optional, require_int, require_map, text_arg};
use crate::errors::{invalid_argument, policy_violation, timed_out, FnError, FnResult};
use crate::host::{EntryType, Query, Row};
use crate::registry::{Arity, CallContext, EffectingFunction, FunctionRegistry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StoreOp {
    Get,
    Set,
    Delete,
    Query,
    Count,
    Exists,
}

struct StoreCall(StoreOp);

pub(super) fn register(registry: &mut FunctionRegistry) {
    let table = [
        ("dbGet", Arity::Between(1, 2), StoreOp::Get),
        ("dbSet", Arity::Between(2, 4), StoreOp::Set),
        ("dbDel", Arity::Between(1, 2), StoreOp::Delete),
        ("dbQuery", Arity::Between(1, 3), StoreOp::Query),
        ("dbCount", Arity::Between(1, 2), StoreOp::Count),
        ("dbExists", Arity::Between(1, 2), StoreOp::Exists),
    ];
    for (name, arity, op) in table {
        registry.register_effecting(name, arity, StoreCall(op));
    }
}

fn key_arg(args: &[Value]) -> Result<String, FnError> {
    let key = text_arg(args, 0)?;
    if key.trim().is_empty() {
        return Err(invalid_argument("registry key must not be empty"));
    }
    Ok(key.trim().to_string())
}

/// Declared entry type at `args[index]`; omitted means string.
fn type_arg(args: &[Value], index: usize) -> Result<EntryType, FnError> {
    match optional(args, index) {
        None | Some(Value::Null) => Ok(EntryType::default()),
        Some(_) => text_arg(args, index)?.parse().map_err(invalid_argument),
    }
}

/// Validate a query against the policy and build its filters.
fn prepare(
    cx: &CallContext<'_>,
    args: &[Value],
) -> Result<(String, Vec<(String, Value)>, Vec<String>), FnError> {
    let table = text_arg(args, 0)?.trim().to_string();
    let Some(columns) = cx.config.query.allowed_columns(&table) else {
        return Err(policy_violation(format!("table `{table}` is not queryable")));
    };
    let filters: Map = match arg(args, 1) {
        Value::Null => Map::new(),
        Value::Str(s) if s.trim().is_empty() => Map::new(),
        _ => require_map(args, 1)?.into_owned(),
    };
    if let Some(column) = filters.keys().find(|c| !columns.contains(*c)) {
        return Err(policy_violation(format!(
            "column `{column}` is not queryable on `{table}`"
        )));
    }
    Ok((table, filters.into_iter().collect(), columns.to_vec()))
}

/// Run a prepared query under the policy's timeout and project each row
/// onto the allowed columns.
async fn run_query(
    cx: &CallContext<'_>,
    args: &[Value],
    limit: usize,
) -> Result<Vec<Row>, FnError> {
    let (table, filters, columns) = prepare(cx, args)?;
    let policy = &cx.config.query;
    let query = Query {
        table: &table,
        filters: &filters,
        limit,
    };
    let rows = tokio::time::timeout(policy.timeout(), cx.store.query(query))
        .await
        .map_err(|_| timed_out(policy.query_timeout_ms))??;
    Ok(rows
        .into_iter()
        .take(limit)
        .map(|mut row| {
            row.retain(|column, _| columns.contains(column));
            row
        })
        .collect())
}

#[async_trait]
impl EffectingFunction for StoreCall {
    async fn call(&self, cx: &CallContext<'_>, args: Vec<Value>) -> FnResult {
        let store = cx.store;
        match self.0 {
            StoreOp::Get => {
                let key = key_arg(&args)?;
                let ty = type_arg(&args, 1)?;
                Ok(store.get(&key, ty).await?.unwrap_or_default())
            }
            StoreOp::Set => {
                let key = key_arg(&args)?;
                let ty = type_arg(&args, 2)?;
                let Some(value) = ty.coerce(arg(&args, 1)) else {
                    let shown = text_arg(&args, 1)?;
                    return Err(invalid_argument(format!("`{shown}` cannot be stored as {ty}")));
                };
                let description = text_arg(&args, 3)?.into_owned();
                store.set(&key, ty, value, &description).await?;
                Ok(Value::Null)
            }
            StoreOp::Delete => {
                let key = key_arg(&args)?;
                let ty = type_arg(&args, 1)?;
                store.delete(&key, ty).await?;
                Ok(Value::Null)
            }
            StoreOp::Query => {
                let requested = match optional(&args, 2) {
                    Some(_) => Some(usize::try_from(require_int(&args, 2)?).unwrap_or(0)),
                    None => None,
                };
                let limit = cx.config.query.clamp_limit(requested);
                if limit == 0 {
                    return Ok(Value::list(Vec::new()));
                }
                let rows = run_query(cx, &args, limit).await?;
                Ok(Value::list(rows.into_iter().map(Value::map).collect()))
            }
            StoreOp::Count => {
                // Bounded by max_rows like any other query.
                let limit = cx.config.query.max_rows;
                let rows = run_query(cx, &args, limit).await?;
                len_to_value(rows.len())
            }
            StoreOp::Exists => {
                let rows = run_query(cx, &args, 1).await?;
                Ok(Value::Bool(!rows.is_empty()))
            }
        }
    }
}

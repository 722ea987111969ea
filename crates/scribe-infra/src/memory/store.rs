//! In-memory row store that evaluates `Select` queries itself.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use scribe_core::error::DataError;
use scribe_core::ports::DataStore;
use scribe_core::query::{Direction, Filter, Relation, Select, Selection};
use scribe_core::schema;

type Tables = HashMap<String, Vec<Value>>;

/// Tables of JSON rows behind an async RwLock.
///
/// Generates `id`, `created_at` and `updated_at` on insert when missing and
/// enforces the unique keys it was configured with, so duplicate writes fail
/// the way they would against the real backend.
/// Note: Data is lost on process restart.
pub struct InMemoryDataStore {
    tables: RwLock<Tables>,
    unique_keys: HashMap<String, Vec<Vec<String>>>,
    calls: AtomicUsize,
}

impl InMemoryDataStore {
    /// Store with the blog schema's unique keys: one like per (post, user)
    /// and unique post slugs.
    pub fn new() -> Self {
        Self::empty()
            .with_unique(schema::LIKES, &["blog_id", "user_id"])
            .with_unique(schema::BLOGS, &["slug"])
    }

    /// Store without any constraints.
    pub fn empty() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            unique_keys: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_unique(mut self, table: &str, columns: &[&str]) -> Self {
        self.unique_keys
            .entry(table.to_string())
            .or_default()
            .push(columns.iter().map(|c| (*c).to_string()).collect());
        self
    }

    /// Put rows in place as-is, bypassing constraints and defaults.
    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of port calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn count_call(&self) {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
    }

    fn violated_key<'a>(
        &self,
        table: &str,
        rows: impl Iterator<Item = &'a Value> + Clone,
        candidate: &Value,
    ) -> Option<String> {
        let keys = self.unique_keys.get(table)?;
        keys.iter()
            .find(|columns| {
                rows.clone().any(|existing| {
                    columns.iter().all(|c| {
                        let value = candidate.get(c).unwrap_or(&Value::Null);
                        !value.is_null() && existing.get(c) == Some(value)
                    })
                })
            })
            .map(|columns| format!("{table}_{}_key", columns.join("_")))
    }
}

impl Default for InMemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_all(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.matches(row))
}

/// Nulls sort after everything else, as in Postgres. Timestamps compare as
/// instants rather than text.
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn project(row: &Value, selection: &Selection, tables: &Tables) -> Value {
    let mut out = if selection.column_list().is_empty() {
        row.as_object().cloned().unwrap_or_default()
    } else {
        selection
            .column_list()
            .iter()
            .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
            .collect::<Map<String, Value>>()
    };

    for embed in selection.embeds() {
        let value = match &embed.relation {
            Relation::BelongsTo { column, table } => {
                let key = row.get(column).unwrap_or(&Value::Null);
                tables
                    .get(table)
                    .and_then(|rows| {
                        rows.iter()
                            .find(|r| !key.is_null() && r.get("id") == Some(key))
                    })
                    .map_or(Value::Null, |target| project(target, &embed.selection, tables))
            }
            Relation::HasMany { table, foreign_key } => {
                let id = row.get("id").unwrap_or(&Value::Null);
                let related = tables
                    .get(table)
                    .map(|rows| {
                        rows.iter()
                            .filter(|r| !id.is_null() && r.get(foreign_key) == Some(id))
                            .map(|r| project(r, &embed.selection, tables))
                            .collect()
                    })
                    .unwrap_or_default();
                Value::Array(related)
            }
        };
        out.insert(embed.alias.clone(), value);
    }

    Value::Object(out)
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, DataError> {
        self.count_call();
        let tables = self.tables.read().await;

        let mut rows: Vec<&Value> = tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| matches_all(r, &query.filters)).collect())
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                );
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        Ok(rows
            .into_iter()
            .map(|r| project(r, &query.selection, &tables))
            .collect())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, DataError> {
        self.count_call();
        let Value::Object(mut fields) = row else {
            return Err(DataError::Decode("insert expects a JSON object".to_string()));
        };

        let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true));
        for (column, default) in [
            ("id", Value::String(uuid::Uuid::new_v4().to_string())),
            ("created_at", now.clone()),
            ("updated_at", now),
        ] {
            if fields.get(column).is_none_or(Value::is_null) {
                fields.insert(column.to_string(), default);
            }
        }
        let row = Value::Object(fields);

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if let Some(key) = self.violated_key(table, rows.iter(), &row) {
            tracing::debug!(table, key = %key, "Unique key violated");
            return Err(DataError::Constraint(format!(
                "duplicate key value violates unique constraint \"{key}\""
            )));
        }
        rows.push(row.clone());

        Ok(vec![row])
    }

    async fn update(
        &self,
        table: &str,
        patch: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, DataError> {
        self.count_call();
        let Value::Object(patch) = patch else {
            return Err(DataError::Decode("update expects a JSON object".to_string()));
        };

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| matches_all(r, filters))
            .map(|(i, _)| i)
            .collect();

        let mut patched = rows.clone();
        for &i in &targets {
            if let Value::Object(fields) = &mut patched[i] {
                for (column, value) in &patch {
                    fields.insert(column.clone(), value.clone());
                }
            }
        }

        // Nothing is written unless every patched row still satisfies its keys.
        let touches_key = self
            .unique_keys
            .get(table)
            .is_some_and(|keys| keys.iter().flatten().any(|c| patch.contains_key(c)));
        if touches_key {
            for &i in &targets {
                let others = patched
                    .iter()
                    .enumerate()
                    .filter(move |(j, _)| *j != i)
                    .map(|(_, r)| r);
                if let Some(key) = self.violated_key(table, others, &patched[i]) {
                    tracing::debug!(table, key = %key, "Unique key violated");
                    return Err(DataError::Constraint(format!(
                        "duplicate key value violates unique constraint \"{key}\""
                    )));
                }
            }
        }

        let updated = targets.iter().map(|&i| patched[i].clone()).collect();
        *rows = patched;
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), DataError> {
        self.count_call();
        if let Some(rows) = self.tables.write().await.get_mut(table) {
            rows.retain(|r| !matches_all(r, filters));
        }
        Ok(())
    }
}

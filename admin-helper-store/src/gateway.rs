//! The gateway contract between admin controllers and storage.

use std::cmp::Ordering;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// One entity instance: field code to value, in field order.
pub type Row = IndexMap<String, Value>;

/// Identifies the entity type a gateway serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHandle {
    /// Token the entity is registered under
    pub name: String,
    /// Storage table (or directory) name, for display
    pub table_name: String,
    /// Primary key column
    pub primary_key: String,
}

impl EntityHandle {
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            primary_key: "ID".to_string(),
        }
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }
}

/// Outcome of a write: the affected id, or the messages explaining the rejection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistResult {
    pub id: Option<String>,
    pub errors: Vec<String>,
}

impl PersistResult {
    pub fn success(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: None,
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_messages(&self) -> &[String] {
        &self.errors
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// Filter, sort and page parameters handed through to [`EntityGateway::list`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Fields to load; empty loads everything
    #[serde(default)]
    pub select: Vec<String>,
    /// Equality filter on field values
    #[serde(default)]
    pub filter: IndexMap<String, Value>,
    #[serde(default)]
    pub sort: Option<SortBy>,
    #[serde(default)]
    pub offset: usize,
    /// Page size; `None` returns all remaining rows
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Whether a row passes the equality filter.
    ///
    /// Numbers and numeric strings compare equal so filters taken from a
    /// query string match numeric columns.
    pub fn matches(&self, row: &Row) -> bool {
        self.filter.iter().all(|(field, wanted)| match row.get(field) {
            Some(actual) => loosely_equal(actual, wanted),
            None => wanted.is_null(),
        })
    }

    /// Filter, sort and paginate a full set of rows in memory.
    pub fn apply(&self, rows: impl IntoIterator<Item = Row>) -> ListResult {
        let mut matched: Vec<Row> = rows.into_iter().filter(|row| self.matches(row)).collect();

        if let Some(sort) = &self.sort {
            matched.sort_by(|a, b| {
                let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let total = matched.len();
        let page = matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|row| project(row, &self.select))
            .collect();

        ListResult { rows: page, total }
    }
}

/// One page of rows plus the unpaginated match count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    pub rows: Vec<Row>,
    pub total: usize,
}

/// Storage contract consumed by the admin controllers.
///
/// `update` is a partial merge: keys absent from `row` keep their stored values.
#[async_trait]
pub trait EntityGateway: Send + Sync {
    fn handle(&self) -> &EntityHandle;

    /// Display name of the backing table.
    fn table_name(&self) -> &str {
        &self.handle().table_name
    }

    /// Load one row. An empty `select` loads every stored field.
    async fn get_by_id(&self, id: &str, select: &[String]) -> Result<Option<Row>>;

    async fn add(&self, row: Row) -> PersistResult;

    async fn update(&self, id: &str, row: Row) -> PersistResult;

    async fn delete(&self, id: &str) -> PersistResult;

    async fn list(&self, query: &ListQuery) -> Result<ListResult>;
}

/// Normalise an id value: non-empty strings and numbers.
pub fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Keep only the selected fields. The primary key travels with its row, so
/// callers include it in `select` when they need it.
pub(crate) fn project(row: Row, select: &[String]) -> Row {
    if select.is_empty() {
        return row;
    }
    row.into_iter()
        .filter(|(code, _)| select.iter().any(|s| s == code))
        .collect()
}

fn loosely_equal(actual: &Value, wanted: &Value) -> bool {
    if actual == wanted {
        return true;
    }
    match (id_of(actual), id_of(wanted)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => {
            let (x, y) = (sort_key(x), sort_key(y));
            match (x.parse::<f64>(), y.parse::<f64>()) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => x.cmp(&y),
            }
        }
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

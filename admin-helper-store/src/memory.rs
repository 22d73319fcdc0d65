//! MemoryGateway: rows held in process memory.
//!
//! Ids are sequential integers rendered as strings, the way an
//! auto-increment primary key shows up in a query string.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::Result;
use crate::gateway::{id_of, project, EntityGateway, EntityHandle, ListQuery, ListResult, PersistResult, Row};

pub struct MemoryGateway {
    handle: EntityHandle,
    rows: RwLock<IndexMap<String, Row>>,
    next_id: AtomicU64,
    unique: Vec<String>,
}

impl MemoryGateway {
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            handle: EntityHandle::new(name, table_name),
            rows: RwLock::new(IndexMap::new()),
            next_id: AtomicU64::new(1),
            unique: Vec::new(),
        }
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.handle = self.handle.with_primary_key(primary_key);
        self
    }

    /// Reject writes that would store a duplicate value in `field`.
    pub fn with_unique(mut self, field: impl Into<String>) -> Self {
        self.unique.push(field.into());
        self
    }

    /// Insert rows as-is, keeping their ids. Used to seed fixtures.
    pub async fn seed(&self, rows: impl IntoIterator<Item = Row>) {
        let mut stored = self.rows.write().await;
        for mut row in rows {
            let id = match row.get(&self.handle.primary_key).and_then(id_of) {
                Some(id) => id,
                None => self.allocate_id(),
            };
            if let Ok(n) = id.parse::<u64>() {
                self.next_id.fetch_max(n + 1, Ordering::SeqCst);
            }
            row.insert(self.handle.primary_key.clone(), Value::String(id.clone()));
            stored.insert(id, row);
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn allocate_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }

    fn unique_violations(&self, rows: &IndexMap<String, Row>, own_id: Option<&str>, row: &Row) -> Vec<String> {
        let mut errors = Vec::new();
        for field in &self.unique {
            let Some(value) = row.get(field) else {
                continue;
            };
            let clash = rows
                .iter()
                .any(|(id, other)| Some(id.as_str()) != own_id && other.get(field) == Some(value));
            if clash {
                errors.push(format!("{field} must be unique, '{}' is taken", display(value)));
            }
        }
        errors
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl EntityGateway for MemoryGateway {
    fn handle(&self) -> &EntityHandle {
        &self.handle
    }

    async fn get_by_id(&self, id: &str, select: &[String]) -> Result<Option<Row>> {
        let rows = self.rows.read().await;
        Ok(rows.get(id).cloned().map(|row| project(row, select)))
    }

    async fn add(&self, mut row: Row) -> PersistResult {
        let mut rows = self.rows.write().await;
        let errors = self.unique_violations(&rows, None, &row);
        if !errors.is_empty() {
            return PersistResult::failed(errors);
        }

        let id = self.allocate_id();
        row.insert(self.handle.primary_key.clone(), Value::String(id.clone()));
        rows.insert(id.clone(), row);
        info!(entity = %self.handle.name, %id, "added row");
        PersistResult::success(id)
    }

    async fn update(&self, id: &str, row: Row) -> PersistResult {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(id) {
            return PersistResult::failed([format!("record {id} not found")]);
        }
        let errors = self.unique_violations(&rows, Some(id), &row);
        if !errors.is_empty() {
            return PersistResult::failed(errors);
        }

        if let Some(stored) = rows.get_mut(id) {
            for (code, value) in row {
                if code != self.handle.primary_key {
                    stored.insert(code, value);
                }
            }
        }
        info!(entity = %self.handle.name, %id, "updated row");
        PersistResult::success(id)
    }

    async fn delete(&self, id: &str) -> PersistResult {
        let mut rows = self.rows.write().await;
        match rows.shift_remove(id) {
            Some(_) => {
                info!(entity = %self.handle.name, %id, "deleted row");
                PersistResult::success(id)
            }
            None => PersistResult::failed([format!("record {id} not found")]),
        }
    }

    async fn list(&self, query: &ListQuery) -> Result<ListResult> {
        let rows = self.rows.read().await;
        let result = query.apply(rows.values().cloned());
        debug!(entity = %self.handle.name, total = result.total, "listed rows");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn add_assigns_sequential_ids() {
        let gateway = MemoryGateway::new("company", "b_company");
        let first = gateway.add(row(&[("NAME", json!("Acme"))])).await;
        let second = gateway.add(row(&[("NAME", json!("Globex"))])).await;
        assert_eq!(first.id.as_deref(), Some("1"));
        assert_eq!(second.id.as_deref(), Some("2"));

        let loaded = gateway.get_by_id("1", &[]).await.unwrap().unwrap();
        assert_eq!(loaded["NAME"], json!("Acme"));
        assert_eq!(loaded["ID"], json!("1"));
    }

    #[tokio::test]
    async fn update_merges_only_given_fields() {
        let gateway = MemoryGateway::new("company", "b_company");
        gateway
            .seed([row(&[("ID", json!(7)), ("NAME", json!("Acme")), ("CITY", json!("Oslo"))])])
            .await;

        let result = gateway.update("7", row(&[("NAME", json!("Acme AS"))])).await;
        assert!(result.is_success());

        let loaded = gateway.get_by_id("7", &[]).await.unwrap().unwrap();
        assert_eq!(loaded["NAME"], json!("Acme AS"));
        assert_eq!(loaded["CITY"], json!("Oslo"));

        // Seeding past an id moves the counter beyond it
        let added = gateway.add(row(&[("NAME", json!("New"))])).await;
        assert_eq!(added.id.as_deref(), Some("8"));
    }

    #[tokio::test]
    async fn update_and_delete_missing_record_fail() {
        let gateway = MemoryGateway::new("company", "b_company");
        assert!(!gateway.update("3", Row::new()).await.is_success());
        assert!(!gateway.delete("3").await.is_success());
    }

    #[tokio::test]
    async fn unique_constraint_rejects_duplicates() {
        let gateway = MemoryGateway::new("company", "b_company").with_unique("CODE");
        assert!(gateway.add(row(&[("CODE", json!("acme"))])).await.is_success());

        let clash = gateway.add(row(&[("CODE", json!("acme"))])).await;
        assert!(!clash.is_success());
        assert_eq!(clash.errors, vec!["CODE must be unique, 'acme' is taken"]);

        // Re-saving a row with its own value is fine
        assert!(gateway.update("1", row(&[("CODE", json!("acme"))])).await.is_success());
    }

    #[tokio::test]
    async fn get_by_id_projects_select() {
        let gateway = MemoryGateway::new("company", "b_company");
        gateway
            .seed([row(&[("ID", json!("1")), ("NAME", json!("Acme")), ("CITY", json!("Oslo"))])])
            .await;
        let loaded = gateway
            .get_by_id("1", &["ID".to_string(), "NAME".to_string()])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(!loaded.contains_key("CITY"));
    }
}

//! FileGateway: one YAML file per record.
//!
//! Records live under a directory as `{id}.yaml`. Ids are ULIDs, so new
//! records sort by creation time. Writes go through a temp file and a rename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::error::{Result, StoreError};
use crate::gateway::{project, EntityGateway, EntityHandle, ListQuery, ListResult, PersistResult, Row};

pub struct FileGateway {
    handle: EntityHandle,
    root: PathBuf,
}

impl FileGateway {
    /// Serve `name` from the records under `root`. The directory is created on first write.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let table_name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Self {
            handle: EntityHandle::new(name, table_name),
            root,
        }
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.handle = self.handle.with_primary_key(primary_key);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> Option<PathBuf> {
        // Ids come from request parameters; refuse anything that could leave the directory.
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return None;
        }
        Some(self.root.join(format!("{id}.yaml")))
    }

    async fn read_record(&self, path: &Path) -> Result<Row> {
        let content = fs::read_to_string(path).await?;
        serde_yaml_ng::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    async fn write_record(&self, id: &str, row: &Row) -> Result<()> {
        let path = self.record_path(id).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("invalid id '{id}'"))
        })?;
        fs::create_dir_all(&self.root).await?;
        let yaml = serde_yaml_ng::to_string(row)?;
        atomic_write(&path, yaml.as_bytes()).await
    }
}

#[async_trait]
impl EntityGateway for FileGateway {
    fn handle(&self) -> &EntityHandle {
        &self.handle
    }

    async fn get_by_id(&self, id: &str, select: &[String]) -> Result<Option<Row>> {
        let Some(path) = self.record_path(id) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let row = self.read_record(&path).await?;
        Ok(Some(project(row, select)))
    }

    async fn add(&self, mut row: Row) -> PersistResult {
        let id = Ulid::new().to_string();
        row.insert(self.handle.primary_key.clone(), Value::String(id.clone()));
        match self.write_record(&id, &row).await {
            Ok(()) => {
                info!(entity = %self.handle.name, %id, "added record");
                PersistResult::success(id)
            }
            Err(e) => PersistResult::failed([e.to_string()]),
        }
    }

    async fn update(&self, id: &str, row: Row) -> PersistResult {
        let Some(path) = self.record_path(id).filter(|p| p.exists()) else {
            return PersistResult::failed([format!("record {id} not found")]);
        };
        let mut stored = match self.read_record(&path).await {
            Ok(stored) => stored,
            Err(e) => return PersistResult::failed([e.to_string()]),
        };
        for (code, value) in row {
            if code != self.handle.primary_key {
                stored.insert(code, value);
            }
        }
        match self.write_record(id, &stored).await {
            Ok(()) => {
                info!(entity = %self.handle.name, %id, "updated record");
                PersistResult::success(id)
            }
            Err(e) => PersistResult::failed([e.to_string()]),
        }
    }

    async fn delete(&self, id: &str) -> PersistResult {
        let Some(path) = self.record_path(id).filter(|p| p.exists()) else {
            return PersistResult::failed([format!("record {id} not found")]);
        };
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(entity = %self.handle.name, %id, "deleted record");
                PersistResult::success(id)
            }
            Err(e) => PersistResult::failed([e.to_string()]),
        }
    }

    async fn list(&self, query: &ListQuery) -> Result<ListResult> {
        let mut rows = Vec::new();
        if self.root.exists() {
            let mut entries = fs::read_dir(&self.root).await?;
            let mut paths = Vec::new();
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                    paths.push(path);
                }
            }
            // ULID names sort by creation time
            paths.sort();
            for path in paths {
                match self.read_record(&path).await {
                    Ok(row) => rows.push(row),
                    Err(e) => warn!(?path, %e, "skipping unreadable record"),
                }
            }
        }
        let result = query.apply(rows);
        debug!(entity = %self.handle.name, total = result.total, "listed records");
        Ok(result)
    }
}

/// Write to a temp file then rename for atomic persistence.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

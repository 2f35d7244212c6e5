//! Flat-file record store: one JSON table per entity under a data
//! directory.
//!
//! Tables load fully into memory at open; every mutation rewrites the
//! owning file. Single-process and synchronous, which is all the core
//! asks of a store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use planboard_core::record::{DependencyRecord, EngineerRecord, Record, TaskRecord};
use planboard_core::store::{Datastore, RecordStore, StoreError};

const ENGINEERS_FILE: &str = "engineers.json";
const TASKS_FILE: &str = "tasks.json";
const DEPENDENCIES_FILE: &str = "dependencies.json";

/// One on-disk table: a JSON array of records, mirrored in memory.
pub struct FileTable<R: Record> {
    path: PathBuf,
    rows: HashMap<u32, R>,
}

impl<R: Record + Serialize + DeserializeOwned> FileTable<R> {
    fn load(path: PathBuf) -> Result<Self> {
        let rows = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read {}", path.display()))?;
            let list: Vec<R> = serde_json::from_str(&raw)
                .with_context(|| format!("parse {}", path.display()))?;
            list.into_iter().map(|r| (r.id(), r)).collect()
        } else {
            HashMap::new()
        };
        debug!(path = %path.display(), rows = rows.len(), "loaded table");
        Ok(Self { path, rows })
    }

    fn flush(&self) -> Result<(), StoreError> {
        let mut list: Vec<&R> = self.rows.values().collect();
        list.sort_by_key(|r| r.id());
        let json = serde_json::to_string_pretty(&list)
            .map_err(|e| StoreError::Backend(format!("serialize {}: {e}", self.path.display())))?;
        fs::write(&self.path, json)
            .map_err(|e| StoreError::Backend(format!("write {}: {e}", self.path.display())))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.rows.clear();
        self.flush()
    }
}

impl<R: Record + Serialize + DeserializeOwned> RecordStore<R> for FileTable<R> {
    fn create(&mut self, record: R) -> Result<u32, StoreError> {
        let id = record.id();
        if self.rows.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        self.rows.insert(id, record);
        self.flush()?;
        Ok(id)
    }

    fn read(&self, id: u32) -> Option<R> {
        self.rows.get(&id).cloned()
    }

    fn read_all(&self) -> Vec<R> {
        self.rows.values().cloned().collect()
    }

    fn update(&mut self, record: R) -> Result<(), StoreError> {
        let id = record.id();
        if !self.rows.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        self.rows.insert(id, record);
        self.flush()
    }

    fn delete(&mut self, id: u32) -> Result<(), StoreError> {
        if self.rows.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        self.flush()
    }
}

/// The three tables of a planboard data directory.
pub struct FileStore {
    dir: PathBuf,
    engineers: FileTable<EngineerRecord>,
    tasks: FileTable<TaskRecord>,
    dependencies: FileTable<DependencyRecord>,
}

impl FileStore {
    /// Open (creating if needed) a data directory. Missing table files are
    /// treated as empty tables.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        Ok(Self {
            engineers: FileTable::load(dir.join(ENGINEERS_FILE))?,
            tasks: FileTable::load(dir.join(TASKS_FILE))?,
            dependencies: FileTable::load(dir.join(DEPENDENCIES_FILE))?,
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Truncate all three tables, on disk and in memory.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.engineers.clear()?;
        self.tasks.clear()?;
        self.dependencies.clear()?;
        debug!(dir = %self.dir.display(), "reset all tables");
        Ok(())
    }
}

impl Datastore for FileStore {
    fn engineers(&self) -> &dyn RecordStore<EngineerRecord> {
        &self.engineers
    }

    fn engineers_mut(&mut self) -> &mut dyn RecordStore<EngineerRecord> {
        &mut self.engineers
    }

    fn tasks(&self) -> &dyn RecordStore<TaskRecord> {
        &self.tasks
    }

    fn tasks_mut(&mut self) -> &mut dyn RecordStore<TaskRecord> {
        &mut self.tasks
    }

    fn dependencies(&self) -> &dyn RecordStore<DependencyRecord> {
        &self.dependencies
    }

    fn dependencies_mut(&mut self) -> &mut dyn RecordStore<DependencyRecord> {
        &mut self.dependencies
    }
}

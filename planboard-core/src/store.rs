//! Record store contract + the in-memory reference implementation.
//!
//! The services only ever talk to a [`Datastore`]: three [`RecordStore`]
//! tables, one per persisted entity. `MemStore` keeps everything in
//! HashMaps and backs the test suite; `planboard-store` provides the
//! flat-file implementation.

use std::collections::HashMap;

use thiserror::Error;

use crate::record::{DependencyRecord, EngineerRecord, Record, TaskRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record with id {0} already exists")]
    AlreadyExists(u32),
    #[error("record with id {0} does not exist")]
    NotFound(u32),
    #[error("storage backend: {0}")]
    Backend(String),
}

/// CRUD over one table of records keyed by integer id.
///
/// `read_all` makes no ordering promise; callers that need a stable order
/// sort by id themselves.
pub trait RecordStore<R: Record> {
    /// Insert a new record. Fails with `AlreadyExists` if the id is taken.
    fn create(&mut self, record: R) -> Result<u32, StoreError>;

    fn read(&self, id: u32) -> Option<R>;

    fn read_all(&self) -> Vec<R>;

    /// Replace an existing record. Fails with `NotFound` if the id is absent.
    fn update(&mut self, record: R) -> Result<(), StoreError>;

    /// Remove a record. Fails with `NotFound` if the id is absent.
    fn delete(&mut self, id: u32) -> Result<(), StoreError>;
}

/// In-memory table: id -> row.
#[derive(Debug, Clone)]
pub struct MemTable<R: Record> {
    rows: HashMap<u32, R>,
}

impl<R: Record> Default for MemTable<R> {
    fn default() -> Self {
        Self { rows: HashMap::new() }
    }
}

impl<R: Record> MemTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R: Record> RecordStore<R> for MemTable<R> {
    fn create(&mut self, record: R) -> Result<u32, StoreError> {
        let id = record.id();
        if self.rows.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        self.rows.insert(id, record);
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
        Ok(())
    }

    fn delete(&mut self, id: u32) -> Result<(), StoreError> {
        self.rows.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }
}

/// The three tables the services operate on.
pub trait Datastore {
    fn engineers(&self) -> &dyn RecordStore<EngineerRecord>;
    fn engineers_mut(&mut self) -> &mut dyn RecordStore<EngineerRecord>;
    fn tasks(&self) -> &dyn RecordStore<TaskRecord>;
    fn tasks_mut(&mut self) -> &mut dyn RecordStore<TaskRecord>;
    fn dependencies(&self) -> &dyn RecordStore<DependencyRecord>;
    fn dependencies_mut(&mut self) -> &mut dyn RecordStore<DependencyRecord>;
}

#[derive(Debug, Default, Clone)]
pub struct MemStore {
    engineers: MemTable<EngineerRecord>,
    tasks: MemTable<TaskRecord>,
    dependencies: MemTable<DependencyRecord>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Datastore for MemStore {
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

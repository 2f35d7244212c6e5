//! Service-boundary errors.
//!
//! Store failures are translated here so callers see the business entity
//! involved, not a bare table row.

use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Engineer,
    Task,
    Milestone,
    Dependency,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Engineer => "engineer",
            EntityKind::Task => "task",
            EntityKind::Milestone => "milestone",
            EntityKind::Dependency => "dependency",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} with id {id} already exists")]
    AlreadyExists { kind: EntityKind, id: u32 },

    #[error("{kind} with id {id} does not exist")]
    NotFound { kind: EntityKind, id: u32 },

    #[error("invalid {kind}: {reason}")]
    InvalidInput { kind: EntityKind, reason: String },

    #[error("storage backend: {0}")]
    Backend(String),
}

impl Error {
    /// Attach an entity kind to a store failure. The id reported is the one
    /// the store rejected.
    pub(crate) fn from_store(err: StoreError, kind: EntityKind) -> Self {
        match err {
            StoreError::AlreadyExists(id) => Error::AlreadyExists { kind, id },
            StoreError::NotFound(id) => Error::NotFound { kind, id },
            StoreError::Backend(msg) => Error::Backend(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

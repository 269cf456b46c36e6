//! Store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the narrow data access contracts the services depend on.
//! - Isolate SQLite query details from service orchestration.
//! - Provide in-memory stores with identical semantics.
//!
//! # Invariants
//! - Write paths call the entity `validate()` before mutating state.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `LessonStore::save` rejects writes based on a stale `revision`.

use crate::db::DbError;
use crate::model::ModelError;
use thiserror::Error;

pub mod lesson_store;
pub mod memory;
pub mod student_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failure surfaced unchanged by services.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid entity: {0}")]
    Model(#[from] ModelError),
    #[error("{entity} already exists: {id}")]
    Duplicate { entity: &'static str, id: String },
    #[error("lesson {id} has revision {actual}, write was based on revision {expected}")]
    StaleRevision {
        id: String,
        expected: u64,
        actual: u64,
    },
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

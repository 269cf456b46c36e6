//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation and store calls into use-case level APIs.
//! - Keep API/CLI layers decoupled from storage details.
//! - Map every failure onto one stable [`ErrorKind`].
//!
//! # Invariants
//! - All validation happens before the first mutating store call.
//! - Store failures are surfaced unchanged; nothing is retried.

use crate::repo::StoreError;
use log::{info, warn};
use std::time::Instant;
use thiserror::Error;

pub mod lesson_service;
pub mod student_service;
pub mod validator;

use validator::ValidationError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a use-case operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    /// Every requested student is already on the roster.
    #[error("students already assigned to lesson {lesson_id}: {}", .student_ids.join(", "))]
    Conflict {
        lesson_id: String,
        student_ids: Vec<String>,
    },
    /// The lesson changed between load and save; the caller may retry.
    #[error("lesson {lesson_id} was modified concurrently; reload and retry")]
    ConcurrentModification { lesson_id: String },
    #[error("store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::StaleRevision { id, .. } => Self::ConcurrentModification { lesson_id: id },
            other => Self::Store(other),
        }
    }
}

/// Stable failure classification, one per [`ServiceError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    ConcurrentModification,
    StoreFailure,
}

impl ErrorKind {
    /// Snake-case code used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ConcurrentModification => "concurrent_modification",
            Self::StoreFailure => "store_failure",
        }
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            Self::Store(_) => ErrorKind::StoreFailure,
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Emits one metadata-only outcome line for a service call.
pub(crate) fn log_outcome<T>(event: &str, started_at: Instant, result: &ServiceResult<T>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!("event={event} module=service status=ok duration_ms={duration_ms}"),
        Err(err) => warn!(
            "event={event} module=service status=error duration_ms={duration_ms} error_code={}",
            err.kind().as_str()
        ),
    }
}

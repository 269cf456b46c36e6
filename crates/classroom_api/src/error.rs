use classroom_core::{DbError, ErrorKind, ServiceError};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Stable failure signal returned at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidArgument,
    NotFound,
    Conflict,
    ConcurrentModification,
    StoreFailure,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::StoreFailure => "STORE_FAILURE",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::InvalidArgument => Self::InvalidArgument,
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::Conflict => Self::Conflict,
            ErrorKind::ConcurrentModification => Self::ConcurrentModification,
            ErrorKind::StoreFailure => Self::StoreFailure,
        }
    }
}

/// Failure envelope: a stable code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self {
            code: value.kind().into(),
            message: value.to_string(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self {
            code: ErrorCode::StoreFailure,
            message: format!("database open failed: {value}"),
        }
    }
}

//! Core domain logic for classroom lessons and students.
//! This crate is the single source of truth for roster invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, SharedConnection};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::lesson::{Lesson, LessonId};
pub use model::student::{Student, StudentId};
pub use model::ModelError;
pub use repo::lesson_store::{LessonStore, SqliteLessonStore};
pub use repo::memory::{MemoryLessonStore, MemoryStudentStore};
pub use repo::student_store::{SqliteStudentStore, StudentStore};
pub use repo::{StoreError, StoreResult};
pub use service::lesson_service::LessonAssignmentService;
pub use service::student_service::StudentService;
pub use service::validator::{AssignmentRequest, LessonInput, StudentInput, ValidationError};
pub use service::{ErrorKind, ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

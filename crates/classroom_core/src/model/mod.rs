//! Domain model for lessons, students and the roster relationship.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own entity-local invariants (`validate()`), independent of storage.
//!
//! # Invariants
//! - Every entity is identified by a stable, immutable string ID.
//! - A lesson roster never contains the same student twice.
//! - Student IDs on a roster are only checked for existence at assignment
//!   time; nothing removes them afterwards.

use thiserror::Error;

pub mod lesson;
pub mod student;

/// Entity-local invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("{entity} id must not be blank")]
    BlankId { entity: &'static str },
    #[error("{field} must not be blank")]
    BlankText { field: &'static str },
    #[error("lesson end date {end} must be after start date {start}")]
    InvalidDateRange { start: String, end: String },
    #[error("roster of lesson {lesson_id} contains an invalid student id `{student_id}`")]
    InvalidRosterEntry {
        lesson_id: String,
        student_id: String,
    },
    #[error("roster of lesson {lesson_id} lists student {student_id} more than once")]
    DuplicateRosterEntry {
        lesson_id: String,
        student_id: String,
    },
}

//! Transport-agnostic API surface over classroom core.
//!
//! # Responsibility
//! - Expose the lesson/student queries and mutations with string inputs.
//! - Render entities into serializable views.
//! - Map every core failure onto one stable [`ErrorCode`].

mod api;
mod error;
mod views;

pub use api::{ClassroomApi, SqliteClassroomApi};
pub use classroom_core::{core_version, ping};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use views::{LessonView, StudentView};

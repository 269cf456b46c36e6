//! Student domain model.

use super::ModelError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a student.
pub type StudentId = String;

/// Person eligible for assignment to lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
}

impl Student {
    /// Creates a new student with a generated stable ID.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), first_name, last_name)
    }

    /// Creates a student with a caller-provided ID.
    pub fn with_id(
        id: impl Into<StudentId>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.trim().is_empty() {
            return Err(ModelError::BlankId { entity: "student" });
        }
        if self.first_name.trim().is_empty() {
            return Err(ModelError::BlankText {
                field: "first_name",
            });
        }
        if self.last_name.trim().is_empty() {
            return Err(ModelError::BlankText { field: "last_name" });
        }
        Ok(())
    }

    /// `"First Last"` rendering for display surfaces.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

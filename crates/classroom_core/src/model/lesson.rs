//! Lesson domain model.
//!
//! # Responsibility
//! - Define the lesson record and its roster of student IDs.
//! - Provide roster helpers used by the assignment service.
//!
//! # Invariants
//! - `id` is stable and never reused for another lesson.
//! - `end_date` is strictly after `start_date`.
//! - `students` holds unique, non-blank IDs in display order.
//! - `revision` only moves forward; stores bump it on every save.

use super::student::StudentId;
use super::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Stable identifier of a lesson.
pub type LessonId = String;

/// Scheduled course session with a bounded time range and a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: LessonId,
    /// Trimmed, non-empty display name.
    pub name: String,
    pub start_date: DateTime<Utc>,
    /// Strictly after `start_date`.
    pub end_date: DateTime<Utc>,
    /// Assigned students: existing entries first, later assignments appended.
    pub students: Vec<StudentId>,
    /// Optimistic concurrency counter observed when the lesson was loaded.
    pub revision: u64,
}

impl Lesson {
    /// Creates a new lesson with a generated ID and an empty roster.
    pub fn new(
        name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, start_date, end_date)
    }

    /// Creates a new lesson with a caller-provided ID.
    ///
    /// Used by import paths and tests where identity already exists. Does not
    /// validate; call [`Lesson::validate`] before persisting.
    pub fn with_id(
        id: impl Into<LessonId>,
        name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date,
            end_date,
            students: Vec::new(),
            revision: 0,
        }
    }

    /// Checks entity-local invariants.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.trim().is_empty() {
            return Err(ModelError::BlankId { entity: "lesson" });
        }
        if self.name.trim().is_empty() {
            return Err(ModelError::BlankText { field: "name" });
        }
        if self.end_date <= self.start_date {
            return Err(ModelError::InvalidDateRange {
                start: self.start_date.to_rfc3339(),
                end: self.end_date.to_rfc3339(),
            });
        }

        let mut seen = HashSet::with_capacity(self.students.len());
        for student_id in &self.students {
            if student_id.trim().is_empty() {
                return Err(ModelError::InvalidRosterEntry {
                    lesson_id: self.id.clone(),
                    student_id: student_id.clone(),
                });
            }
            if !seen.insert(student_id.as_str()) {
                return Err(ModelError::DuplicateRosterEntry {
                    lesson_id: self.id.clone(),
                    student_id: student_id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Returns requested IDs that are not on the roster yet, in request order.
    pub fn missing_from_roster<'a>(&self, requested: &'a [StudentId]) -> Vec<&'a StudentId> {
        let assigned: HashSet<&str> = self.students.iter().map(String::as_str).collect();
        requested
            .iter()
            .filter(|id| !assigned.contains(id.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Lesson;
    use crate::model::ModelError;
    use chrono::{TimeZone, Utc};

    fn lesson() -> Lesson {
        Lesson::with_id(
            "lesson-1",
            "Math 101",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn new_lesson_has_generated_id_and_empty_roster() {
        let base = lesson();
        let created = Lesson::new(base.name.clone(), base.start_date, base.end_date);
        assert!(!created.id.is_empty());
        assert!(created.students.is_empty());
        assert_eq!(created.revision, 0);
        assert!(created.validate().is_ok());
    }

    #[test]
    fn validate_rejects_equal_dates() {
        let mut lesson = lesson();
        lesson.end_date = lesson.start_date;
        assert!(matches!(
            lesson.validate(),
            Err(ModelError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_roster_entries() {
        let mut lesson = lesson();
        lesson.students = vec!["s1".to_string(), "s1".to_string()];
        assert!(matches!(
            lesson.validate(),
            Err(ModelError::DuplicateRosterEntry { student_id, .. }) if student_id == "s1"
        ));
    }

    #[test]
    fn missing_from_roster_keeps_request_order() {
        let mut lesson = lesson();
        lesson.students = vec!["s2".to_string()];
        let requested = vec!["s3".to_string(), "s2".to_string(), "s1".to_string()];
        let missing = lesson.missing_from_roster(&requested);
        assert_eq!(missing, vec!["s3", "s1"]);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let mut lesson = lesson();
        lesson.students = vec!["s1".to_string()];
        let value = serde_json::to_value(&lesson).unwrap();
        assert_eq!(value["startDate"], "2024-01-01T00:00:00Z");
        assert_eq!(value["endDate"], "2024-06-30T00:00:00Z");
        assert_eq!(value["students"], serde_json::json!(["s1"]));
        assert_eq!(value["revision"], 0);
    }
}

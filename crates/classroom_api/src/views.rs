use chrono::{DateTime, SecondsFormat, Utc};
use classroom_core::{Lesson, Student};
use serde::Serialize;

/// Lesson as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonView {
    pub id: String,
    pub name: String,
    /// RFC 3339, UTC.
    pub start_date: String,
    /// RFC 3339, UTC.
    pub end_date: String,
    pub students: Vec<String>,
}

impl From<Lesson> for LessonView {
    fn from(lesson: Lesson) -> Self {
        Self {
            start_date: format_timestamp(lesson.start_date),
            end_date: format_timestamp(lesson.end_date),
            id: lesson.id,
            name: lesson.name,
            students: lesson.students,
        }
    }
}

/// Student as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<Student> for StudentView {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            first_name: student.first_name,
            last_name: student.last_name,
        }
    }
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

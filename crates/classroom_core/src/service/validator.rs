//! Pure input validation for lesson, student and assignment requests.
//!
//! # Responsibility
//! - Check request shape and formats before any store is touched.
//! - Normalize accepted input (trimmed text, parsed UTC timestamps,
//!   deduplicated student IDs).
//!
//! # Invariants
//! - Functions here have no side effects and never consult a store.
//! - Duplicates inside one assignment request collapse silently; the first
//!   occurrence decides the order.

use crate::model::lesson::LessonId;
use crate::model::student::StudentId;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use std::collections::HashSet;
use thiserror::Error;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";
/// Stores persist epoch milliseconds; finer input is truncated.
const TIMESTAMP_SUBSEC_DIGITS: u16 = 3;

/// Malformed or missing caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("lesson name must not be blank")]
    EmptyName,
    #[error("{field} must not be blank")]
    EmptyField { field: &'static str },
    #[error("{field} `{value}` is not a valid date or timestamp")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("end date {end} must be after start date {start}")]
    EndNotAfterStart { start: String, end: String },
    #[error("lesson id must not be blank")]
    EmptyLessonId,
    #[error("at least one non-blank student id is required")]
    NoStudentIds,
}

/// Normalized lesson creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonInput {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Normalized assignment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub lesson_id: LessonId,
    /// Trimmed, non-blank, unique; first-occurrence order.
    pub student_ids: Vec<StudentId>,
}

/// Normalized student creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentInput {
    pub first_name: String,
    pub last_name: String,
}

/// Validates lesson creation input.
///
/// # Errors
/// - `EmptyName` when `name` is blank after trimming.
/// - `InvalidTimestamp` when either date does not parse.
/// - `EndNotAfterStart` when `end <= start`.
pub fn validate_lesson_input(
    name: &str,
    start_date: &str,
    end_date: &str,
) -> Result<LessonInput, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let start = parse_timestamp("start date", start_date)?;
    let end = parse_timestamp("end date", end_date)?;
    if end <= start {
        return Err(ValidationError::EndNotAfterStart {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
    }

    Ok(LessonInput {
        name: name.to_string(),
        start_date: start,
        end_date: end,
    })
}

/// Validates an assignment request and collapses in-request duplicates.
///
/// # Errors
/// - `EmptyLessonId` when `lesson_id` is blank after trimming.
/// - `NoStudentIds` when no entry of `student_ids` is non-blank.
pub fn validate_assignment_request<S: AsRef<str>>(
    lesson_id: &str,
    student_ids: &[S],
) -> Result<AssignmentRequest, ValidationError> {
    let lesson_id = lesson_id.trim();
    if lesson_id.is_empty() {
        return Err(ValidationError::EmptyLessonId);
    }

    let mut seen = HashSet::with_capacity(student_ids.len());
    let unique_ids: Vec<StudentId> = student_ids
        .iter()
        .map(|id| id.as_ref().trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect();

    if unique_ids.is_empty() {
        return Err(ValidationError::NoStudentIds);
    }

    Ok(AssignmentRequest {
        lesson_id: lesson_id.to_string(),
        student_ids: unique_ids,
    })
}

/// Validates student creation input.
pub fn validate_student_input(
    first_name: &str,
    last_name: &str,
) -> Result<StudentInput, ValidationError> {
    Ok(StudentInput {
        first_name: validate_non_blank("first name", first_name)?,
        last_name: validate_non_blank("last name", last_name)?,
    })
}

/// Returns the trimmed value, or `EmptyField` when it is blank.
pub fn validate_non_blank(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

/// Parses a calendar date or timestamp into UTC, truncated to milliseconds.
///
/// Accepts RFC 3339 (any offset), naive `YYYY-MM-DDTHH:MM:SS[.fff]` or
/// `YYYY-MM-DD HH:MM:SS[.fff]` read as UTC, and `YYYY-MM-DD` at midnight UTC.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = value.trim();
    parse_utc(trimmed)
        .map(|timestamp| timestamp.trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS))
        .ok_or_else(|| ValidationError::InvalidTimestamp {
            field,
            value: trimmed.to_string(),
        })
}

fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn lesson_input_is_trimmed_and_parsed() {
        let input = validate_lesson_input("  Math 101 ", "2024-01-01", "2024-06-30").unwrap();
        assert_eq!(input.name, "Math 101");
        assert_eq!(
            input.start_date,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            input.end_date,
            Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn lesson_input_rejects_blank_name() {
        assert_eq!(
            validate_lesson_input(" \t", "2024-01-01", "2024-06-30"),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn lesson_input_rejects_unparsable_dates() {
        let err = validate_lesson_input("Math", "2024-13-01", "2024-06-30").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidTimestamp { field: "start date", .. }
        ));

        let err = validate_lesson_input("Math", "2024-01-01", "next tuesday").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidTimestamp { field: "end date", .. }
        ));

        let err = validate_lesson_input("Math", "", "2024-06-30").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimestamp { .. }));
    }

    #[test]
    fn lesson_input_requires_end_strictly_after_start() {
        assert!(matches!(
            validate_lesson_input("Math", "2024-01-01", "2024-01-01"),
            Err(ValidationError::EndNotAfterStart { .. })
        ));
        assert!(matches!(
            validate_lesson_input("Math", "2024-06-30", "2024-01-01"),
            Err(ValidationError::EndNotAfterStart { .. })
        ));
    }

    #[test]
    fn parse_timestamp_accepts_supported_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp("t", "2024-03-05T09:30:00Z").unwrap(), expected);
        assert_eq!(
            parse_timestamp("t", "2024-03-05T11:30:00+02:00").unwrap(),
            expected
        );
        assert_eq!(parse_timestamp("t", "2024-03-05T09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("t", " 2024-03-05 09:30:00 ").unwrap(), expected);
        assert_eq!(
            parse_timestamp("t", "2024-03-05").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn parse_timestamp_truncates_to_milliseconds() {
        let parsed = parse_timestamp("t", "2024-01-01T00:00:00.123456789Z").unwrap();
        assert_eq!(parsed.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(
            DateTime::from_timestamp_millis(parsed.timestamp_millis()),
            Some(parsed)
        );
    }

    #[test]
    fn lesson_input_compares_dates_at_millisecond_precision() {
        assert!(matches!(
            validate_lesson_input("Tiny", "2024-01-01T00:00:00.0001Z", "2024-01-01T00:00:00.0009Z"),
            Err(ValidationError::EndNotAfterStart { .. })
        ));

        let input =
            validate_lesson_input("Tiny", "2024-01-01T00:00:00.0001Z", "2024-01-01T00:00:00.0019Z")
                .unwrap();
        assert_eq!(input.start_date.timestamp_subsec_millis(), 0);
        assert_eq!(input.end_date.timestamp_subsec_millis(), 1);
    }

    #[test]
    fn assignment_request_dedupes_and_trims() {
        let request =
            validate_assignment_request(" lesson-1 ", &["s2", " s1", "s2 ", "", "s1"]).unwrap();
        assert_eq!(request.lesson_id, "lesson-1");
        assert_eq!(request.student_ids, vec!["s2", "s1"]);
    }

    #[test]
    fn assignment_request_rejects_blank_inputs() {
        assert_eq!(
            validate_assignment_request("  ", &["s1"]),
            Err(ValidationError::EmptyLessonId)
        );
        assert_eq!(
            validate_assignment_request::<&str>("lesson-1", &[]),
            Err(ValidationError::NoStudentIds)
        );
        assert_eq!(
            validate_assignment_request("lesson-1", &[" ", ""]),
            Err(ValidationError::NoStudentIds)
        );
    }

    #[test]
    fn student_input_requires_both_names() {
        assert_eq!(
            validate_student_input("Ada", " "),
            Err(ValidationError::EmptyField { field: "last name" })
        );
        let input = validate_student_input(" Ada ", "Lovelace").unwrap();
        assert_eq!(input.first_name, "Ada");
    }
}

//! Lesson store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/find/list/save APIs over `lessons` + `lesson_students`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Lists are ordered by `start_date ASC`, ties by insertion order.
//! - A save writes the lesson row and its roster in one transaction.
//! - A save only applies when the persisted revision matches the caller's.

use crate::db::SharedConnection;
use crate::model::lesson::{Lesson, LessonId};
use crate::repo::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::collections::HashMap;
use std::sync::{Arc, MutexGuard};

const LESSON_SELECT_SQL: &str = "SELECT
    id,
    name,
    start_date,
    end_date,
    revision
FROM lessons";

/// Persistence contract for lessons.
///
/// Implementations must be shareable across threads: existence checks and
/// assignments may run concurrently.
pub trait LessonStore: Send + Sync {
    /// Inserts a new lesson. Fails with `Duplicate` when the ID is taken.
    fn create(&self, lesson: &Lesson) -> StoreResult<Lesson>;
    fn find_by_id(&self, id: &str) -> StoreResult<Option<Lesson>>;
    /// All lessons ordered by ascending start date.
    fn find_all(&self) -> StoreResult<Vec<Lesson>>;
    /// Upserts by ID and returns the stored lesson with its next revision.
    ///
    /// Fails with `StaleRevision` when the lesson exists and its persisted
    /// revision differs from `lesson.revision`.
    fn save(&self, lesson: &Lesson) -> StoreResult<Lesson>;
}

impl<T: LessonStore + ?Sized> LessonStore for Arc<T> {
    fn create(&self, lesson: &Lesson) -> StoreResult<Lesson> {
        (**self).create(lesson)
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Lesson>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> StoreResult<Vec<Lesson>> {
        (**self).find_all()
    }

    fn save(&self, lesson: &Lesson) -> StoreResult<Lesson> {
        (**self).save(lesson)
    }
}

/// SQLite-backed lesson store.
#[derive(Clone)]
pub struct SqliteLessonStore {
    conn: SharedConnection,
}

impl SqliteLessonStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".to_string()))
    }
}

impl LessonStore for SqliteLessonStore {
    fn create(&self, lesson: &Lesson) -> StoreResult<Lesson> {
        lesson.validate()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if persisted_revision(&tx, &lesson.id)?.is_some() {
            return Err(StoreError::Duplicate {
                entity: "lesson",
                id: lesson.id.clone(),
            });
        }

        tx.execute(
            "INSERT INTO lessons (id, name, start_date, end_date, revision)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                lesson.id.as_str(),
                lesson.name.as_str(),
                lesson.start_date.timestamp_millis(),
                lesson.end_date.timestamp_millis(),
                revision_to_db(lesson.revision)?,
            ],
        )?;
        replace_roster(&tx, lesson)?;
        tx.commit()?;

        Ok(lesson.clone())
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Lesson>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("{LESSON_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(LessonRow::from_row(row)),
            )
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        let row = row?;

        let mut stmt = conn.prepare(
            "SELECT student_id
             FROM lesson_students
             WHERE lesson_id = ?1
             ORDER BY position ASC;",
        )?;
        let students = stmt
            .query_map([id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        row.into_lesson(students).map(Some)
    }

    fn find_all(&self) -> StoreResult<Vec<Lesson>> {
        let conn = self.lock()?;

        let mut rosters: HashMap<LessonId, Vec<String>> = HashMap::new();
        let mut roster_stmt = conn.prepare(
            "SELECT lesson_id, student_id
             FROM lesson_students
             ORDER BY lesson_id ASC, position ASC;",
        )?;
        let mut roster_rows = roster_stmt.query([])?;
        while let Some(row) = roster_rows.next()? {
            rosters
                .entry(row.get("lesson_id")?)
                .or_default()
                .push(row.get("student_id")?);
        }

        let mut stmt = conn.prepare(&format!(
            "{LESSON_SELECT_SQL} ORDER BY start_date ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut lessons = Vec::new();
        while let Some(row) = rows.next()? {
            let row = LessonRow::from_row(row)?;
            let students = rosters.remove(&row.id).unwrap_or_default();
            lessons.push(row.into_lesson(students)?);
        }

        Ok(lessons)
    }

    fn save(&self, lesson: &Lesson) -> StoreResult<Lesson> {
        lesson.validate()?;
        let next_revision = lesson.revision + 1;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        match persisted_revision(&tx, &lesson.id)? {
            Some(actual) if actual != lesson.revision => {
                return Err(StoreError::StaleRevision {
                    id: lesson.id.clone(),
                    expected: lesson.revision,
                    actual,
                });
            }
            Some(_) => {
                tx.execute(
                    "UPDATE lessons
                     SET
                        name = ?1,
                        start_date = ?2,
                        end_date = ?3,
                        revision = ?4,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?5 AND revision = ?6;",
                    params![
                        lesson.name.as_str(),
                        lesson.start_date.timestamp_millis(),
                        lesson.end_date.timestamp_millis(),
                        revision_to_db(next_revision)?,
                        lesson.id.as_str(),
                        revision_to_db(lesson.revision)?,
                    ],
                )?;
            }
            None => {
                tx.execute(
                    "INSERT INTO lessons (id, name, start_date, end_date, revision)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        lesson.id.as_str(),
                        lesson.name.as_str(),
                        lesson.start_date.timestamp_millis(),
                        lesson.end_date.timestamp_millis(),
                        revision_to_db(next_revision)?,
                    ],
                )?;
            }
        }
        replace_roster(&tx, lesson)?;
        tx.commit()?;

        let mut saved = lesson.clone();
        saved.revision = next_revision;
        Ok(saved)
    }
}

struct LessonRow {
    id: String,
    name: String,
    start_date: i64,
    end_date: i64,
    revision: i64,
}

impl LessonRow {
    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            revision: row.get("revision")?,
        })
    }

    fn into_lesson(self, students: Vec<String>) -> StoreResult<Lesson> {
        let revision = u64::try_from(self.revision).map_err(|_| {
            StoreError::InvalidData(format!(
                "invalid revision `{}` in lessons.revision",
                self.revision
            ))
        })?;

        let lesson = Lesson {
            start_date: timestamp_from_db("start_date", self.start_date)?,
            end_date: timestamp_from_db("end_date", self.end_date)?,
            id: self.id,
            name: self.name,
            students,
            revision,
        };
        lesson
            .validate()
            .map_err(|err| StoreError::InvalidData(err.to_string()))?;
        Ok(lesson)
    }
}

fn persisted_revision(tx: &Transaction<'_>, id: &str) -> StoreResult<Option<u64>> {
    let revision = tx
        .query_row("SELECT revision FROM lessons WHERE id = ?1;", [id], |row| {
            row.get::<_, i64>(0)
        })
        .optional()?;

    revision
        .map(|value| {
            u64::try_from(value).map_err(|_| {
                StoreError::InvalidData(format!("invalid revision `{value}` in lessons.revision"))
            })
        })
        .transpose()
}

fn replace_roster(tx: &Transaction<'_>, lesson: &Lesson) -> StoreResult<()> {
    tx.execute(
        "DELETE FROM lesson_students WHERE lesson_id = ?1;",
        [lesson.id.as_str()],
    )?;

    let mut stmt = tx.prepare(
        "INSERT INTO lesson_students (lesson_id, student_id, position)
         VALUES (?1, ?2, ?3);",
    )?;
    for (position, student_id) in lesson.students.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| StoreError::InvalidData("roster position overflow".to_string()))?;
        stmt.execute(params![lesson.id.as_str(), student_id.as_str(), position])?;
    }

    Ok(())
}

fn revision_to_db(revision: u64) -> StoreResult<i64> {
    i64::try_from(revision)
        .map_err(|_| StoreError::InvalidData(format!("revision `{revision}` exceeds storage range")))
}

fn timestamp_from_db(column: &str, value: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid timestamp `{value}` in lessons.{column}"))
    })
}

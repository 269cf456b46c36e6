//! Student store contract and SQLite implementation.

use crate::db::SharedConnection;
use crate::model::student::Student;
use crate::repo::{StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, MutexGuard};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name
FROM students";

/// Persistence contract for students.
pub trait StudentStore: Send + Sync {
    /// Inserts a new student. Fails with `Duplicate` when the ID is taken.
    fn create(&self, student: &Student) -> StoreResult<Student>;
    fn find_by_id(&self, id: &str) -> StoreResult<Option<Student>>;
    /// All students ordered by last name, first name, then ID.
    fn find_all(&self) -> StoreResult<Vec<Student>>;
}

impl<T: StudentStore + ?Sized> StudentStore for Arc<T> {
    fn create(&self, student: &Student) -> StoreResult<Student> {
        (**self).create(student)
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Student>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> StoreResult<Vec<Student>> {
        (**self).find_all()
    }
}

/// SQLite-backed student store.
#[derive(Clone)]
pub struct SqliteStudentStore {
    conn: SharedConnection,
}

impl SqliteStudentStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".to_string()))
    }
}

impl StudentStore for SqliteStudentStore {
    fn create(&self, student: &Student) -> StoreResult<Student> {
        student.validate()?;

        let conn = self.lock()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM students WHERE id = ?1);",
            [student.id.as_str()],
            |row| row.get(0),
        )?;
        if exists {
            return Err(StoreError::Duplicate {
                entity: "student",
                id: student.id.clone(),
            });
        }

        conn.execute(
            "INSERT INTO students (id, first_name, last_name) VALUES (?1, ?2, ?3);",
            params![
                student.id.as_str(),
                student.first_name.as_str(),
                student.last_name.as_str(),
            ],
        )?;

        Ok(student.clone())
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Student>> {
        let conn = self.lock()?;
        let student = conn
            .query_row(
                &format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_student_row(row)),
            )
            .optional()?;

        student.transpose()
    }

    fn find_all(&self) -> StoreResult<Vec<Student>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{STUDENT_SELECT_SQL} ORDER BY last_name ASC, first_name ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }
}

fn parse_student_row(row: &Row<'_>) -> StoreResult<Student> {
    let student = Student {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
    };
    student
        .validate()
        .map_err(|err| StoreError::InvalidData(err.to_string()))?;
    Ok(student)
}

//! In-memory store implementations.
//!
//! Same contracts as the SQLite stores, backed by mutex-guarded maps. Used by
//! tests and by callers that embed the services without a database.

use crate::model::lesson::{Lesson, LessonId};
use crate::model::student::{Student, StudentId};
use crate::repo::lesson_store::LessonStore;
use crate::repo::student_store::StudentStore;
use crate::repo::{StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct LessonTable {
    rows: HashMap<LessonId, (u64, Lesson)>,
    next_seq: u64,
}

impl LessonTable {
    fn insert(&mut self, lesson: Lesson) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.rows.insert(lesson.id.clone(), (seq, lesson));
    }
}

/// Lesson store kept entirely in process memory.
#[derive(Default)]
pub struct MemoryLessonStore {
    table: Mutex<LessonTable>,
}

impl MemoryLessonStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, LessonTable>> {
        self.table
            .lock()
            .map_err(|_| StoreError::Unavailable("lesson table lock poisoned".to_string()))
    }
}

impl LessonStore for MemoryLessonStore {
    fn create(&self, lesson: &Lesson) -> StoreResult<Lesson> {
        lesson.validate()?;

        let mut table = self.lock()?;
        if table.rows.contains_key(&lesson.id) {
            return Err(StoreError::Duplicate {
                entity: "lesson",
                id: lesson.id.clone(),
            });
        }
        table.insert(lesson.clone());
        Ok(lesson.clone())
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Lesson>> {
        let table = self.lock()?;
        Ok(table.rows.get(id).map(|(_, lesson)| lesson.clone()))
    }

    fn find_all(&self) -> StoreResult<Vec<Lesson>> {
        let table = self.lock()?;
        let mut rows: Vec<&(u64, Lesson)> = table.rows.values().collect();
        rows.sort_by_key(|(seq, lesson)| (lesson.start_date, *seq));
        Ok(rows.into_iter().map(|(_, lesson)| lesson.clone()).collect())
    }

    fn save(&self, lesson: &Lesson) -> StoreResult<Lesson> {
        lesson.validate()?;

        let mut table = self.lock()?;
        let mut saved = lesson.clone();
        saved.revision = lesson.revision + 1;

        match table.rows.get_mut(&lesson.id) {
            Some((_, current)) if current.revision != lesson.revision => {
                Err(StoreError::StaleRevision {
                    id: lesson.id.clone(),
                    expected: lesson.revision,
                    actual: current.revision,
                })
            }
            Some((_, current)) => {
                *current = saved.clone();
                Ok(saved)
            }
            None => {
                table.insert(saved.clone());
                Ok(saved)
            }
        }
    }
}

/// Student store kept entirely in process memory.
#[derive(Default)]
pub struct MemoryStudentStore {
    rows: Mutex<HashMap<StudentId, Student>>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<StudentId, Student>>> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("student table lock poisoned".to_string()))
    }
}

impl StudentStore for MemoryStudentStore {
    fn create(&self, student: &Student) -> StoreResult<Student> {
        student.validate()?;

        let mut rows = self.lock()?;
        if rows.contains_key(&student.id) {
            return Err(StoreError::Duplicate {
                entity: "student",
                id: student.id.clone(),
            });
        }
        rows.insert(student.id.clone(), student.clone());
        Ok(student.clone())
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Student>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn find_all(&self) -> StoreResult<Vec<Student>> {
        let mut students: Vec<Student> = self.lock()?.values().cloned().collect();
        students.sort_by(|a, b| {
            (&a.last_name, &a.first_name, &a.id).cmp(&(&b.last_name, &b.first_name, &b.id))
        });
        Ok(students)
    }
}

//! Use-case API for lesson and student callers.
//!
//! # Responsibility
//! - Expose the seven lesson/student operations behind string inputs.
//! - Keep error semantics stable: one [`ErrorCode`] per failure kind.
//!
//! # Invariants
//! - Operations never panic; every failure is an [`ApiError`].
//! - No operation answers a known failure with a generic error.

use crate::error::ApiResult;
use crate::views::{LessonView, StudentView};
use classroom_core::db::{open_shared_db, open_shared_db_in_memory, SharedConnection};
use classroom_core::{
    LessonAssignmentService, LessonStore, SqliteLessonStore, SqliteStudentStore, StudentService,
    StudentStore,
};
use log::info;
use std::path::Path;
use std::sync::Arc;

/// API facade composed from explicit lesson and student stores.
pub struct ClassroomApi<L: LessonStore, S: StudentStore> {
    lessons: LessonAssignmentService<L, Arc<S>>,
    students: StudentService<Arc<S>>,
}

/// API backed by one SQLite database.
pub type SqliteClassroomApi = ClassroomApi<SqliteLessonStore, SqliteStudentStore>;

impl<L: LessonStore, S: StudentStore> ClassroomApi<L, S> {
    pub fn new(lessons: L, students: S) -> Self {
        let students = Arc::new(students);
        Self {
            lessons: LessonAssignmentService::new(lessons, Arc::clone(&students)),
            students: StudentService::new(students),
        }
    }

    /// Query `lesson(id)`.
    pub fn lesson(&self, id: &str) -> ApiResult<LessonView> {
        Ok(self.lessons.get_lesson(id)?.into())
    }

    /// Query `lessons()`, ordered by ascending start date.
    pub fn lessons(&self) -> ApiResult<Vec<LessonView>> {
        Ok(self
            .lessons
            .get_all_lessons()?
            .into_iter()
            .map(LessonView::from)
            .collect())
    }

    /// Mutation `createLesson(name, startDate, endDate)`.
    pub fn create_lesson(
        &self,
        name: &str,
        start_date: &str,
        end_date: &str,
    ) -> ApiResult<LessonView> {
        Ok(self
            .lessons
            .create_lesson(name, start_date, end_date)?
            .into())
    }

    /// Mutation `assignStudentsToLesson(lessonId, studentIds)`.
    pub fn assign_students_to_lesson<T: AsRef<str>>(
        &self,
        lesson_id: &str,
        student_ids: &[T],
    ) -> ApiResult<LessonView> {
        Ok(self
            .lessons
            .assign_students_to_lesson(lesson_id, student_ids)?
            .into())
    }

    /// Query `student(id)`.
    pub fn student(&self, id: &str) -> ApiResult<StudentView> {
        Ok(self.students.get_student(id)?.into())
    }

    /// Query `students()`.
    pub fn students(&self) -> ApiResult<Vec<StudentView>> {
        Ok(self
            .students
            .get_all_students()?
            .into_iter()
            .map(StudentView::from)
            .collect())
    }

    /// Mutation `createStudent(firstName, lastName)`.
    pub fn create_student(&self, first_name: &str, last_name: &str) -> ApiResult<StudentView> {
        Ok(self.students.create_student(first_name, last_name)?.into())
    }
}

impl SqliteClassroomApi {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> ApiResult<Self> {
        info!("event=api_open module=api status=start mode=file");
        Ok(Self::from_connection(open_shared_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> ApiResult<Self> {
        info!("event=api_open module=api status=start mode=memory");
        Ok(Self::from_connection(open_shared_db_in_memory()?))
    }

    pub fn from_connection(conn: SharedConnection) -> Self {
        Self::new(
            SqliteLessonStore::new(conn.clone()),
            SqliteStudentStore::new(conn),
        )
    }
}

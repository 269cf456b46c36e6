//! Lesson use-case service: creation, lookup and student assignment.
//!
//! # Responsibility
//! - Validate lesson and assignment requests before touching stores.
//! - Resolve referenced students and apply roster changes atomically from
//!   the caller's point of view.
//!
//! # Invariants
//! - Every requested student is confirmed to exist before the roster changes.
//! - A failed assignment leaves the persisted roster untouched.
//! - Assignments to the same lesson are serialized in-process; writes based
//!   on a stale revision are rejected by the store.
//! - An assignment that would add nothing fails with `Conflict`.

use crate::model::lesson::{Lesson, LessonId};
use crate::model::student::StudentId;
use crate::repo::lesson_store::LessonStore;
use crate::repo::student_store::StudentStore;
use crate::service::validator::{
    validate_assignment_request, validate_lesson_input, validate_non_blank,
};
use crate::service::{log_outcome, ServiceError, ServiceResult};
use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Lesson service composed from explicit store collaborators.
pub struct LessonAssignmentService<L: LessonStore, S: StudentStore> {
    lessons: L,
    students: S,
    locks: LessonLocks,
}

impl<L: LessonStore, S: StudentStore> LessonAssignmentService<L, S> {
    pub fn new(lessons: L, students: S) -> Self {
        Self {
            lessons,
            students,
            locks: LessonLocks::default(),
        }
    }

    /// Creates a lesson with a fresh ID and an empty roster.
    pub fn create_lesson(
        &self,
        name: &str,
        start_date: &str,
        end_date: &str,
    ) -> ServiceResult<Lesson> {
        let started_at = Instant::now();
        let result = validate_lesson_input(name, start_date, end_date)
            .map_err(ServiceError::from)
            .and_then(|input| {
                let lesson = Lesson::new(input.name, input.start_date, input.end_date);
                Ok(self.lessons.create(&lesson)?)
            });
        if let Ok(created) = &result {
            debug!("event=lesson_create module=service lesson_id={}", created.id);
        }
        log_outcome("lesson_create", started_at, &result);
        result
    }

    /// Gets one lesson by ID.
    ///
    /// # Errors
    /// - `InvalidArgument` for a blank ID.
    /// - `NotFound` when no lesson has this ID.
    pub fn get_lesson(&self, id: &str) -> ServiceResult<Lesson> {
        let started_at = Instant::now();
        let result = validate_non_blank("lesson id", id)
            .map_err(ServiceError::from)
            .and_then(|id| self.load_lesson(&id));
        log_outcome("lesson_get", started_at, &result);
        result
    }

    /// Lists all lessons by ascending start date.
    pub fn get_all_lessons(&self) -> ServiceResult<Vec<Lesson>> {
        let started_at = Instant::now();
        let result = self.lessons.find_all().map_err(ServiceError::from);
        log_outcome("lesson_list", started_at, &result);
        result
    }

    /// Adds students to a lesson roster.
    ///
    /// # Contract
    /// - In-request duplicates collapse; blank entries are ignored.
    /// - Existing roster entries keep their order; new ones are appended in
    ///   request order.
    ///
    /// # Errors
    /// - `InvalidArgument` for a blank lesson ID or no usable student IDs.
    /// - `NotFound` for an unknown lesson, or the first unknown student in
    ///   request order.
    /// - `Conflict` when every requested student is already assigned.
    /// - `ConcurrentModification` when another writer saved the lesson first.
    pub fn assign_students_to_lesson<T: AsRef<str>>(
        &self,
        lesson_id: &str,
        student_ids: &[T],
    ) -> ServiceResult<Lesson> {
        let started_at = Instant::now();
        let result = validate_assignment_request(lesson_id, student_ids)
            .map_err(ServiceError::from)
            .and_then(|request| {
                self.locks.with_lock(&request.lesson_id, || {
                    self.apply_assignment(&request.lesson_id, &request.student_ids)
                })
            });
        log_outcome("lesson_assign", started_at, &result);
        result
    }

    fn apply_assignment(&self, lesson_id: &str, requested: &[StudentId]) -> ServiceResult<Lesson> {
        let mut lesson = self.load_lesson(lesson_id)?;
        self.ensure_students_exist(requested)?;

        let additions: Vec<StudentId> = lesson
            .missing_from_roster(requested)
            .into_iter()
            .cloned()
            .collect();
        if additions.is_empty() {
            return Err(ServiceError::Conflict {
                lesson_id: lesson.id,
                student_ids: requested.to_vec(),
            });
        }

        debug!(
            "event=lesson_assign module=service lesson_id={} requested={} added={} revision={}",
            lesson.id,
            requested.len(),
            additions.len(),
            lesson.revision
        );
        lesson.students.extend(additions);
        Ok(self.lessons.save(&lesson)?)
    }

    fn load_lesson(&self, id: &str) -> ServiceResult<Lesson> {
        self.lessons
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::not_found("lesson", id))
    }

    /// Looks up every ID concurrently, then inspects the joined results.
    ///
    /// All lookups complete before any failure is reported. Store failures
    /// win over missing students; within each class the first ID in request
    /// order is reported.
    fn ensure_students_exist(&self, ids: &[StudentId]) -> ServiceResult<()> {
        let students = &self.students;
        let lookups: Vec<_> = ids.par_iter().map(|id| students.find_by_id(id)).collect();

        let mut found = Vec::with_capacity(lookups.len());
        for lookup in lookups {
            found.push(lookup?.is_some());
        }

        match ids.iter().zip(found).find(|(_, exists)| !exists) {
            Some((missing, _)) => Err(ServiceError::not_found("student", missing.as_str())),
            None => Ok(()),
        }
    }
}

/// Per-lesson mutex registry.
///
/// Slots are created on demand and dropped once no caller holds or waits on
/// them, so the map only grows with the number of lessons in flight.
#[derive(Default)]
struct LessonLocks {
    slots: Mutex<HashMap<LessonId, Arc<Mutex<()>>>>,
}

impl LessonLocks {
    fn with_lock<T>(&self, lesson_id: &str, f: impl FnOnce() -> T) -> T {
        let slot = self.slot(lesson_id);
        let result = {
            // The guarded value is `()`, so a poisoned slot carries no broken state.
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release(lesson_id, &slot);
        result
    }

    fn slot(&self, lesson_id: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(lesson_id.to_string()).or_default())
    }

    fn release(&self, lesson_id: &str, slot: &Arc<Mutex<()>>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map plus the caller's: nobody else is waiting.
        if Arc::strong_count(slot) == 2 {
            slots.remove(lesson_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::{LessonAssignmentService, LessonLocks};
    use crate::model::student::Student;
    use crate::repo::memory::{MemoryLessonStore, MemoryStudentStore};
    use crate::repo::student_store::StudentStore;
    use crate::service::ErrorKind;

    #[test]
    fn lesson_locks_are_pruned_after_use() {
        let locks = LessonLocks::default();
        let value = locks.with_lock("lesson-1", || {
            assert_eq!(locks.len(), 1);
            7
        });
        assert_eq!(value, 7);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn unknown_lesson_is_reported_before_unknown_students() {
        let students = MemoryStudentStore::new();
        students.create(&Student::with_id("s1", "Ada", "Lovelace")).unwrap();
        let service = LessonAssignmentService::new(MemoryLessonStore::new(), students);

        let err = service
            .assign_students_to_lesson("missing", &["ghost"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("lesson not found: missing"));
    }
}

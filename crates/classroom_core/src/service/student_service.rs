//! Student use-case service.
//!
//! # Responsibility
//! - Provide create/get/list entry points for students.
//!
//! # Invariants
//! - Names are trimmed and non-blank before they reach the store.

use crate::model::student::Student;
use crate::repo::student_store::StudentStore;
use crate::service::validator::{validate_non_blank, validate_student_input};
use crate::service::{log_outcome, ServiceError, ServiceResult};
use std::time::Instant;

/// Student service composed from an explicit store collaborator.
pub struct StudentService<S: StudentStore> {
    students: S,
}

impl<S: StudentStore> StudentService<S> {
    pub fn new(students: S) -> Self {
        Self { students }
    }

    /// Creates a student with a fresh ID.
    pub fn create_student(&self, first_name: &str, last_name: &str) -> ServiceResult<Student> {
        let started_at = Instant::now();
        let result = validate_student_input(first_name, last_name)
            .map_err(ServiceError::from)
            .and_then(|input| {
                let student = Student::new(input.first_name, input.last_name);
                Ok(self.students.create(&student)?)
            });
        log_outcome("student_create", started_at, &result);
        result
    }

    /// Gets one student by ID.
    pub fn get_student(&self, id: &str) -> ServiceResult<Student> {
        let started_at = Instant::now();
        let result = validate_non_blank("student id", id)
            .map_err(ServiceError::from)
            .and_then(|id| {
                self.students
                    .find_by_id(&id)?
                    .ok_or_else(|| ServiceError::not_found("student", id))
            });
        log_outcome("student_get", started_at, &result);
        result
    }

    pub fn get_all_students(&self) -> ServiceResult<Vec<Student>> {
        let started_at = Instant::now();
        let result = self.students.find_all().map_err(ServiceError::from);
        log_outcome("student_list", started_at, &result);
        result
    }
}

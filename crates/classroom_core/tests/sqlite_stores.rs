use chrono::{TimeZone, Utc};
use classroom_core::db::{open_shared_db, open_shared_db_in_memory};
use classroom_core::{
    Lesson, LessonAssignmentService, LessonStore, SqliteLessonStore, SqliteStudentStore,
    StoreError, Student, StudentService, StudentStore,
};
use std::sync::Barrier;
use std::thread;

fn lesson(id: &str, start_month: u32) -> Lesson {
    Lesson::with_id(
        id,
        format!("Lesson {id}"),
        Utc.with_ymd_and_hms(2024, start_month, 1, 9, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, start_month, 1, 10, 30, 0).unwrap(),
    )
}

#[test]
fn lesson_create_and_find_roundtrip() {
    let store = SqliteLessonStore::new(open_shared_db_in_memory().unwrap());

    let mut created = lesson("l1", 3);
    created.students = vec!["s2".to_string(), "s1".to_string()];
    store.create(&created).unwrap();

    let loaded = store.find_by_id("l1").unwrap().unwrap();
    assert_eq!(loaded, created);
    assert!(store.find_by_id("missing").unwrap().is_none());
}

#[test]
fn lesson_create_rejects_duplicates_and_invalid_lessons() {
    let store = SqliteLessonStore::new(open_shared_db_in_memory().unwrap());
    store.create(&lesson("l1", 3)).unwrap();

    let err = store.create(&lesson("l1", 4)).unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { entity: "lesson", .. }));

    let mut backwards = lesson("l2", 3);
    backwards.end_date = backwards.start_date;
    assert!(matches!(
        store.create(&backwards).unwrap_err(),
        StoreError::Model(_)
    ));
}

#[test]
fn lesson_find_all_orders_by_start_date_then_insertion() {
    let store = SqliteLessonStore::new(open_shared_db_in_memory().unwrap());
    store.create(&lesson("may", 5)).unwrap();
    store.create(&lesson("feb-a", 2)).unwrap();
    store.create(&lesson("jan", 1)).unwrap();
    store.create(&lesson("feb-b", 2)).unwrap();

    let ids: Vec<String> = store
        .find_all()
        .unwrap()
        .into_iter()
        .map(|lesson| lesson.id)
        .collect();
    assert_eq!(ids, vec!["jan", "feb-a", "feb-b", "may"]);
}

#[test]
fn lesson_save_upserts_and_preserves_roster_order() {
    let store = SqliteLessonStore::new(open_shared_db_in_memory().unwrap());

    let mut fresh = lesson("l1", 1);
    fresh.students = vec!["s3".to_string()];
    let inserted = store.save(&fresh).unwrap();
    assert_eq!(inserted.revision, 1);

    let mut updated = inserted.clone();
    updated.students.extend(["s1".to_string(), "s2".to_string()]);
    let saved = store.save(&updated).unwrap();
    assert_eq!(saved.revision, 2);

    let loaded = store.find_by_id("l1").unwrap().unwrap();
    assert_eq!(loaded.students, vec!["s3", "s1", "s2"]);
    assert_eq!(loaded.revision, 2);
}

#[test]
fn lesson_save_rejects_stale_revision_and_keeps_state() {
    let store = SqliteLessonStore::new(open_shared_db_in_memory().unwrap());
    let created = store.create(&lesson("l1", 1)).unwrap();

    let mut winner = created.clone();
    winner.students.push("s1".to_string());
    store.save(&winner).unwrap();

    let mut loser = created;
    loser.students.push("s2".to_string());
    let err = store.save(&loser).unwrap_err();
    assert!(matches!(
        err,
        StoreError::StaleRevision { expected: 0, actual: 1, .. }
    ));

    let loaded = store.find_by_id("l1").unwrap().unwrap();
    assert_eq!(loaded.students, vec!["s1"]);
}

#[test]
fn student_store_roundtrip_and_ordering() {
    let store = SqliteStudentStore::new(open_shared_db_in_memory().unwrap());
    store
        .create(&Student::with_id("s1", "Grace", "Hopper"))
        .unwrap();
    store
        .create(&Student::with_id("s2", "Ada", "Lovelace"))
        .unwrap();
    store
        .create(&Student::with_id("s3", "Alan", "Hopper"))
        .unwrap();

    assert_eq!(
        store.find_by_id("s2").unwrap(),
        Some(Student::with_id("s2", "Ada", "Lovelace"))
    );
    assert!(store.find_by_id("s9").unwrap().is_none());

    let ids: Vec<String> = store
        .find_all()
        .unwrap()
        .into_iter()
        .map(|student| student.id)
        .collect();
    assert_eq!(ids, vec!["s3", "s1", "s2"]);

    let err = store
        .create(&Student::with_id("s1", "Someone", "Else"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { entity: "student", .. }));
}

#[test]
fn services_share_one_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classroom.sqlite3");

    let lesson_id = {
        let conn = open_shared_db(&path).unwrap();
        let students = StudentService::new(SqliteStudentStore::new(conn.clone()));
        let lessons = LessonAssignmentService::new(
            SqliteLessonStore::new(conn.clone()),
            SqliteStudentStore::new(conn),
        );

        let ada = students.create_student("Ada", "Lovelace").unwrap();
        let alan = students.create_student("Alan", "Turing").unwrap();
        let lesson = lessons
            .create_lesson("Math 101", "2024-01-01", "2024-06-30")
            .unwrap();
        lessons
            .assign_students_to_lesson(&lesson.id, &[ada.id.as_str(), alan.id.as_str()])
            .unwrap();
        lesson.id
    };

    let conn = open_shared_db(&path).unwrap();
    let lessons = LessonAssignmentService::new(
        SqliteLessonStore::new(conn.clone()),
        SqliteStudentStore::new(conn),
    );
    let reopened = lessons.get_lesson(&lesson_id).unwrap();
    assert_eq!(reopened.students.len(), 2);
    assert_eq!(reopened.revision, 1);
}

#[test]
fn concurrent_disjoint_assignments_over_sqlite_are_both_kept() {
    let conn = open_shared_db_in_memory().unwrap();
    let students = SqliteStudentStore::new(conn.clone());
    for id in ["a", "b"] {
        students
            .create(&Student::with_id(id, "First", format!("Last {id}")))
            .unwrap();
    }
    let lessons = SqliteLessonStore::new(conn.clone());
    let service = LessonAssignmentService::new(lessons.clone(), students);

    for _ in 0..25 {
        let lesson = service
            .create_lesson("Race", "2024-01-01", "2024-01-02")
            .unwrap();
        let barrier = Barrier::new(2);

        thread::scope(|scope| {
            for student in ["a", "b"] {
                let service = &service;
                let barrier = &barrier;
                let lesson_id = lesson.id.as_str();
                scope.spawn(move || {
                    barrier.wait();
                    service
                        .assign_students_to_lesson(lesson_id, &[student])
                        .unwrap();
                });
            }
        });

        let stored = lessons.find_by_id(&lesson.id).unwrap().unwrap();
        let mut roster = stored.students.clone();
        roster.sort();
        assert_eq!(roster, vec!["a", "b"]);
        assert_eq!(stored.revision, 2);
    }
}

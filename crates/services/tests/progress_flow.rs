use std::io::Write;
use std::sync::Arc;

use course_core::model::{AttemptId, CourseContent};
use course_core::time::fixed_now;
use course_core::{GateOptions, Rejection, Score, Transition};
use services::{Clock, ProgressService, ProgressServiceError, load_course, parse_course};
use storage::repository::{InMemoryRepository, ProgressRepository, StorageError};

const COURSE_JSON: &str = r#"{
    "id": "first-aid",
    "title": "First aid basics",
    "lessons": [
        {
            "id": "airway",
            "title": "Airway",
            "summary": "Check the airway first.",
            "quickChecks": [{
                "id": "q1",
                "question": "What comes first?",
                "options": [
                    {"id": "airway", "label": "Airway", "correct": true},
                    {"id": "bleeding", "label": "Bleeding"}
                ]
            }]
        },
        {
            "id": "recovery",
            "title": "Recovery position",
            "quickChecks": [{
                "id": "q1",
                "question": "Which side?",
                "options": [
                    {"id": "side", "label": "On their side", "correct": true},
                    {"id": "back", "label": "On their back"}
                ]
            }]
        }
    ],
    "scenarios": [{
        "id": "collapse",
        "title": "Collapse in the street",
        "situation": "Someone collapses in front of you.",
        "actions": [
            {"id": "1", "label": "Check for danger", "correct": true},
            {"id": "2", "label": "Walk away"}
        ]
    }]
}"#;

fn course() -> Arc<CourseContent> {
    Arc::new(parse_course(COURSE_JSON).unwrap())
}

fn service(repo: &InMemoryRepository) -> ProgressService {
    ProgressService::new(
        Clock::fixed(fixed_now()),
        GateOptions::default(),
        Arc::new(repo.clone()),
    )
}

#[tokio::test]
async fn completing_lessons_appends_records_and_snapshots() {
    let repo = InMemoryRepository::new();
    let service = service(&repo);
    let mut engine = service.start(course()).await.unwrap();
    let attempt = engine.attempt_id();

    let blocked = service.complete_current_lesson(&mut engine).await.unwrap();
    assert_eq!(blocked.transition, Transition::Rejected(Rejection::LessonIncomplete));
    assert!(blocked.record.is_none());

    engine.select_lesson_answer("q1", "airway");
    engine.reveal_lesson_answer("q1");
    let first = service.complete_current_lesson(&mut engine).await.unwrap();
    assert_eq!(first.transition, Transition::Applied);
    assert!(!first.lessons_complete);
    let record = first.record.unwrap();
    assert_eq!(record.lesson_id.as_str(), "airway");
    assert_eq!(record.resume_lesson_id.as_str(), "recovery");
    assert_eq!(record.score, Score::new(1, 1));
    assert_eq!(record.completed_at, fixed_now());

    engine.select_lesson_answer("q1", "side");
    engine.reveal_lesson_answer("q1");
    let last = service.complete_current_lesson(&mut engine).await.unwrap();
    assert!(last.lessons_complete);
    assert_eq!(last.record.unwrap().resume_lesson_id.as_str(), "recovery");

    let again = service.complete_current_lesson(&mut engine).await.unwrap();
    assert_eq!(again.transition, Transition::Unchanged);
    assert!(again.record.is_none());

    let history = service.completion_history(attempt).await.unwrap();
    let lessons: Vec<&str> = history.iter().map(|r| r.lesson_id.as_str()).collect();
    assert_eq!(lessons, ["airway", "recovery"]);

    let snapshot = repo.load_snapshot(attempt).await.unwrap();
    assert_eq!(&snapshot.progress, engine.state());
}

#[tokio::test]
async fn resume_continues_latest_attempt() {
    let repo = InMemoryRepository::new();
    let service = service(&repo);

    let mut engine = service.start(course()).await.unwrap();
    engine.select_lesson_answer("q1", "airway");
    engine.reveal_lesson_answer("q1");
    service.complete_current_lesson(&mut engine).await.unwrap();
    engine.select_lesson_answer("q1", "back");
    service.save_snapshot(&engine).await.unwrap();

    let resumed = service.resume(course()).await.unwrap();
    assert_eq!(resumed.attempt_id(), engine.attempt_id());
    assert_eq!(resumed.current_lesson_index(), 1);
    assert_eq!(resumed.state(), engine.state());
}

#[tokio::test]
async fn resume_without_history_starts_fresh_attempt() {
    let repo = InMemoryRepository::new();
    let service = service(&repo);

    let engine = service.resume(course()).await.unwrap();
    assert_eq!(engine.current_lesson_index(), 0);
    let stored = repo.load_snapshot(engine.attempt_id()).await.unwrap();
    assert_eq!(stored.course_id.as_str(), "first-aid");
}

#[tokio::test]
async fn restart_then_save_becomes_the_resumed_attempt() {
    let repo = InMemoryRepository::new();
    let service = service(&repo);

    let mut engine = service.start(course()).await.unwrap();
    let old = engine.attempt_id();
    let new = engine.restart();
    service.save_snapshot(&engine).await.unwrap();

    let resumed = service.resume(course()).await.unwrap();
    assert_eq!(resumed.attempt_id(), new);
    assert_ne!(resumed.attempt_id(), old);
    assert!(service.completion_history(new).await.unwrap().is_empty());
}

#[tokio::test]
async fn resume_attempt_checks_course_and_existence() {
    let repo = InMemoryRepository::new();
    let service = service(&repo);
    let engine = service.start(course()).await.unwrap();

    let other = Arc::new(
        parse_course(r#"{"id": "other", "title": "Other", "lessons": [{"id": "l", "title": "L"}]}"#)
            .unwrap(),
    );
    let err = service
        .resume_attempt(other, engine.attempt_id())
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressServiceError::CourseMismatch { .. }));

    let err = service
        .resume_attempt(course(), AttemptId::generate())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProgressServiceError::Storage(StorageError::NotFound)
    ));

    let same = service
        .resume_attempt(course(), engine.attempt_id())
        .await
        .unwrap();
    assert_eq!(same.attempt_id(), engine.attempt_id());
}

#[tokio::test]
async fn resume_under_stricter_gate_revokes_lenient_completion() {
    let repo = InMemoryRepository::new();
    let lenient = ProgressService::new(
        Clock::fixed(fixed_now()),
        GateOptions {
            require_correct_to_complete: false,
            ..GateOptions::default()
        },
        Arc::new(repo.clone()),
    );
    let mut engine = lenient.start(course()).await.unwrap();
    engine.select_lesson_answer("q1", "bleeding");
    engine.reveal_lesson_answer("q1");
    let result = lenient.complete_current_lesson(&mut engine).await.unwrap();
    assert_eq!(result.record.unwrap().score, Score::new(0, 1));

    let strict = service(&repo).resume(course()).await.unwrap();
    assert!(!strict.is_lesson_completed("airway"));
    assert_eq!(strict.current_lesson_index(), 0);
}

#[test]
fn load_course_reads_json_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(COURSE_JSON.as_bytes()).unwrap();

    let content = load_course(file.path()).unwrap();
    assert_eq!(content.title(), "First aid basics");
    assert_eq!(content.lessons().len(), 2);
    assert_eq!(content.scenarios()[0].correct_count(), 1);
}

#[test]
fn bundled_demo_course_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/listening-skills.json");
    let content = load_course(&path).unwrap();
    assert_eq!(content.lessons().len(), 3);
    assert_eq!(content.scenarios().len(), 2);
    assert!(content.issues().is_empty());
}

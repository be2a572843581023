use chrono::NaiveDate;

use matura::catalog::{LessonCatalog, StaticSource, TrackRegistry};
use matura::db::SqliteProgressStore;
use matura::engine::{Clock, EngineState, ProgressEngine, Step};
use matura::error::EngineError;
use matura::models::{AnswerOption, Lesson, LessonId, Question};
use matura::store::{MemoryProgressStore, ProgressStore};

fn question(prompt: &str) -> Question {
    Question::new(
        prompt,
        vec![
            AnswerOption::new("correct", true),
            AnswerOption::new("incorrect", false),
        ],
    )
}

/// Lesson 1 (10 XP, 2 questions) and locked lesson 2.
fn two_lesson_catalog() -> LessonCatalog {
    let source = StaticSource::new(
        "grammar",
        "Grammar",
        vec![
            Lesson::new(1, "Nouns", 10)
                .with_question(question("a"))
                .with_question(question("b")),
            Lesson::new(2, "Verbs", 10)
                .locked(true)
                .with_question(question("c"))
                .with_question(question("d")),
        ],
    );
    LessonCatalog::load(&source).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn complete(engine: &mut ProgressEngine, lesson: u32, answers: &[usize]) -> u32 {
    engine.select_lesson(LessonId::new(lesson)).unwrap();
    engine.start_lesson().unwrap();
    for answer in answers {
        engine.submit_answer(*answer).unwrap();
        if let Step::Completed(outcome) = engine.next_question().unwrap() {
            outcome.saved.unwrap();
            engine.acknowledge_completion().unwrap();
            return outcome.summary.xp_earned;
        }
    }
    panic!("lesson {} did not complete", lesson);
}

#[test]
fn scenario_full_marks() {
    let store = MemoryProgressStore::new();
    let mut engine =
        ProgressEngine::open(two_lesson_catalog(), Box::new(store.clone()), Clock::fixed(date(2025, 4, 1)))
            .unwrap();

    assert_eq!(complete(&mut engine, 1, &[0, 0]), 10);
    let saved = store.load("grammar").unwrap();
    assert!(saved.is_completed(LessonId::new(1)));
    assert_eq!(saved.leaderboard_progress, 1);
    assert_eq!(saved.xp, 10);
}

#[test]
fn scenario_half_marks() {
    let mut engine = ProgressEngine::open(
        two_lesson_catalog(),
        Box::new(MemoryProgressStore::new()),
        Clock::fixed(date(2025, 4, 1)),
    )
    .unwrap();
    assert_eq!(complete(&mut engine, 1, &[1, 0]), 5);
}

#[test]
fn scenario_double_submit() {
    let mut engine = ProgressEngine::open(
        two_lesson_catalog(),
        Box::new(MemoryProgressStore::new()),
        Clock::fixed(date(2025, 4, 1)),
    )
    .unwrap();
    engine.select_lesson(LessonId::new(1)).unwrap();
    engine.start_lesson().unwrap();
    engine.submit_answer(0).unwrap();
    let state = engine.state();

    assert!(matches!(engine.submit_answer(1), Err(EngineError::AlreadyAnswered)));
    assert_eq!(engine.state(), state);
}

#[test]
fn scenario_locked_then_unlocked() {
    let mut engine = ProgressEngine::open(
        two_lesson_catalog(),
        Box::new(MemoryProgressStore::new()),
        Clock::fixed(date(2025, 4, 1)),
    )
    .unwrap();

    assert!(engine.is_locked(LessonId::new(2)));
    assert!(matches!(
        engine.select_lesson(LessonId::new(2)),
        Err(EngineError::LockedLesson(_))
    ));
    complete(&mut engine, 1, &[0, 0]);
    assert!(!engine.is_locked(LessonId::new(2)));
    assert!(engine.select_lesson(LessonId::new(2)).is_ok());
}

#[test]
fn scenario_next_before_answer() {
    let mut engine = ProgressEngine::open(
        two_lesson_catalog(),
        Box::new(MemoryProgressStore::new()),
        Clock::fixed(date(2025, 4, 1)),
    )
    .unwrap();
    engine.select_lesson(LessonId::new(1)).unwrap();
    engine.start_lesson().unwrap();

    assert!(engine.next_question().is_err());
    assert_eq!(
        engine.state(),
        EngineState::InQuestion {
            lesson: LessonId::new(1),
            index: 0
        }
    );
}

#[test]
fn streak_follows_calendar_days() {
    let catalog = TrackRegistry::with_builtins().open("literature").unwrap();
    let mut engine = ProgressEngine::open(
        catalog,
        Box::new(MemoryProgressStore::new()),
        Clock::fixed(date(2025, 12, 31)),
    )
    .unwrap();

    complete(&mut engine, 1, &[2, 1]);
    assert_eq!(engine.progress().streak, 1);

    // Same day: unchanged
    complete(&mut engine, 2, &[0, 0]);
    assert_eq!(engine.progress().streak, 1);

    // Next day, across a year boundary
    engine.clock_mut().advance_days(1);
    complete(&mut engine, 3, &[0]);
    assert_eq!(engine.progress().streak, 2);
    assert_eq!(engine.progress().last_activity, Some(date(2026, 1, 1)));
    assert_eq!(engine.progress().xp, 30);
}

#[test]
fn streak_resets_after_gap() {
    let catalog = TrackRegistry::with_builtins().open("literature").unwrap();
    let store = MemoryProgressStore::new();
    let mut engine =
        ProgressEngine::open(catalog.clone(), Box::new(store.clone()), Clock::fixed(date(2025, 6, 1)))
            .unwrap();
    complete(&mut engine, 1, &[2, 1]);
    engine.clock_mut().advance_days(1);
    complete(&mut engine, 2, &[0, 0]);
    assert_eq!(engine.progress().streak, 2);

    // Three days later a new session sees the lapsed streak
    let mut engine =
        ProgressEngine::open(catalog, Box::new(store.clone()), Clock::fixed(date(2025, 6, 5))).unwrap();
    assert_eq!(engine.progress().streak, 0);
    complete(&mut engine, 3, &[0]);
    assert_eq!(engine.progress().streak, 1);
}

#[test]
fn progress_survives_reopening_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("matura.db");
    let today = Clock::fixed(date(2025, 3, 10));

    {
        let store = SqliteProgressStore::open(&db_path).unwrap();
        let mut engine =
            ProgressEngine::open(two_lesson_catalog(), Box::new(store), today).unwrap();
        complete(&mut engine, 1, &[0, 1]);
    }

    let store = SqliteProgressStore::open(&db_path).unwrap();
    let mut engine = ProgressEngine::open(two_lesson_catalog(), Box::new(store), today).unwrap();
    let progress = engine.progress().clone();
    assert_eq!(progress.xp, 5);
    assert_eq!(progress.streak, 1);
    assert_eq!(progress.current_lesson, Some(LessonId::new(2)));
    assert!(progress.is_completed(LessonId::new(1)));

    // Replaying a rewarded lesson grants nothing, even across sessions
    assert_eq!(complete(&mut engine, 1, &[0, 0]), 0);
    assert_eq!(engine.progress().xp, 5);
    assert_eq!(engine.progress().leaderboard_progress, 1);

    complete(&mut engine, 2, &[0, 0]);
    let reopened = SqliteProgressStore::open(&db_path).unwrap();
    let saved = reopened.load("grammar").unwrap();
    assert_eq!(saved.xp, 15);
    assert_eq!(saved.completed.len(), 2);
}

#[test]
fn tracks_keep_separate_progress() {
    let store = MemoryProgressStore::new();
    let registry = TrackRegistry::with_builtins();
    let today = Clock::fixed(date(2025, 7, 7));

    let mut bulgarian =
        ProgressEngine::open(registry.open("bulgarian").unwrap(), Box::new(store.clone()), today).unwrap();
    complete(&mut bulgarian, 1, &[2, 1]);

    let literature =
        ProgressEngine::open(registry.open("literature").unwrap(), Box::new(store.clone()), today).unwrap();
    assert_eq!(literature.progress().xp, 0);
    assert_eq!(store.load("bulgarian").unwrap().xp, 10);
}

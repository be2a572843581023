use thiserror::Error;

use crate::models::LessonId;

/// Errors raised by a `ProgressStore` backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt progress record: {0}")]
    Corrupt(String),

    #[error("progress store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while loading or validating a lesson catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown track '{0}'")]
    UnknownTrack(String),

    #[error("reading catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("parsing catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("lesson {0} appears more than once")]
    DuplicateLesson(LessonId),

    #[error("lesson {0} must award a positive amount of XP")]
    InvalidXp(LessonId),

    #[error("lesson {lesson}, question {question}: {reason}")]
    InvalidQuestion {
        lesson: LessonId,
        question: usize,
        reason: String,
    },
}

/// Errors returned by `ProgressEngine` transitions.
///
/// Everything except `Store` is a contract violation: the engine stays in the
/// state it was in before the call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("lesson {0} is locked")]
    LockedLesson(LessonId),

    #[error("lesson {0} does not exist")]
    UnknownLesson(LessonId),

    #[error("lesson {0} has no questions yet")]
    EmptyLesson(LessonId),

    #[error("option {index} is out of range (question has {count} options)")]
    InvalidOptionIndex { index: usize, count: usize },

    #[error("question already answered")]
    AlreadyAnswered,

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

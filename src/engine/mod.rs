//! Lesson progress engine: question sequencing, scoring, XP and streaks.

pub mod clock;
pub mod machine;
pub mod rewards;
pub mod streak;

pub use clock::Clock;
pub use machine::{
    AnswerFeedback, BoardEntry, CompletionOutcome, CompletionSummary, EngineState, LessonPreview,
    LessonStatus, ProgressEngine, QuestionView, Step,
};

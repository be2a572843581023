pub mod lesson;
pub mod progress;

pub use lesson::{AnswerOption, Lesson, LessonId, Question};
pub use progress::{DailyGoal, ProgressState};

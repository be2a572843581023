use log::{debug, info, warn};

use crate::catalog::LessonCatalog;
use crate::engine::clock::Clock;
use crate::engine::rewards::xp_earned;
use crate::engine::streak;
use crate::error::{EngineError, StoreError};
use crate::models::{DailyGoal, LessonId, ProgressState, Question};
use crate::store::ProgressStore;

// ─── Engine outputs ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    LessonPreview {
        lesson: LessonId,
    },
    InQuestion {
        lesson: LessonId,
        index: usize,
    },
    AnswerShown {
        lesson: LessonId,
        index: usize,
        selected: usize,
        correct: bool,
    },
    LessonComplete(CompletionSummary),
}

impl EngineState {
    fn describe(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::LessonPreview { .. } => "previewing a lesson",
            EngineState::InQuestion { .. } => "waiting for an answer",
            EngineState::AnswerShown { .. } => "showing an answer",
            EngineState::LessonComplete(_) => "showing the completion summary",
        }
    }
}

/// What the host shows before the learner starts a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonPreview {
    pub id: LessonId,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub xp: u32,
    pub question_count: usize,
    pub content: Option<String>,
    pub crown: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub lesson: LessonId,
    pub index: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<String>,
}

impl QuestionView {
    fn new(lesson: LessonId, index: usize, total: usize, question: &Question) -> Self {
        Self {
            lesson,
            index,
            total,
            prompt: question.prompt.clone(),
            options: question.options.iter().map(|o| o.text.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_option: Option<usize>,
    /// Only surfaced for incorrect answers.
    pub explanation: Option<String>,
    pub is_last: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSummary {
    pub lesson: LessonId,
    pub xp_earned: u32,
    pub correct_answers: usize,
    pub total_questions: usize,
    /// False when the lesson had already been rewarded before this attempt.
    pub newly_completed: bool,
    pub streak: u32,
}

#[derive(Debug)]
pub struct CompletionOutcome {
    pub summary: CompletionSummary,
    /// Result of persisting the new progress. In-memory progress is kept
    /// either way.
    pub saved: Result<(), StoreError>,
}

#[derive(Debug)]
pub enum Step {
    Question(QuestionView),
    Completed(CompletionOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonStatus {
    Completed,
    Current,
    Available,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEntry {
    pub id: LessonId,
    pub title: String,
    pub icon: String,
    pub xp: u32,
    pub crown: bool,
    pub playable: bool,
    pub status: LessonStatus,
}

// ─── Engine ─────────────────────────────────────────────────────────────────

struct Attempt {
    lesson: LessonId,
    lesson_xp: u32,
    questions: Vec<Question>,
    correct_answers: usize,
}

/// Drives one learner through the lessons of a single catalog.
///
/// Transitions run synchronously to completion. Only a finished lesson
/// mutates `ProgressState`; an abandoned attempt leaves no trace.
pub struct ProgressEngine {
    catalog: LessonCatalog,
    store: Box<dyn ProgressStore>,
    clock: Clock,
    progress: ProgressState,
    state: EngineState,
    attempt: Option<Attempt>,
    pending_save: Option<StoreError>,
}

impl ProgressEngine {
    /// Load progress for the catalog's track and run the idle streak check.
    pub fn open(
        catalog: LessonCatalog,
        store: Box<dyn ProgressStore>,
        clock: Clock,
    ) -> Result<Self, EngineError> {
        let mut progress = store.load(catalog.track())?;
        debug!(
            "Loaded progress for '{}': {} XP, {} lessons, streak {}",
            catalog.track(),
            progress.xp,
            progress.completed.len(),
            progress.streak
        );

        let mut pending_save = None;
        let streak = streak::check_idle(progress.last_activity, clock.today(), progress.streak);
        if streak != progress.streak {
            info!("Streak of {} lapsed for '{}'", progress.streak, catalog.track());
            progress.streak = streak;
            if let Err(e) = store.save(catalog.track(), &progress) {
                warn!("Streak reset for '{}' not saved: {}", catalog.track(), e);
                pending_save = Some(e);
            }
        }

        Ok(Self {
            catalog,
            store,
            clock,
            progress,
            state: EngineState::Idle,
            attempt: None,
            pending_save,
        })
    }

    /// Last write that failed and has not been retried successfully since.
    pub fn pending_save(&self) -> Option<&StoreError> {
        self.pending_save.as_ref()
    }

    pub fn catalog(&self) -> &LessonCatalog {
        &self.catalog
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// The suggested lesson: the stored pointer, or the first lesson.
    pub fn current_lesson(&self) -> Option<LessonId> {
        self.progress
            .current_lesson
            .or_else(|| self.catalog.first().map(|l| l.id))
    }

    pub fn is_locked(&self, id: LessonId) -> bool {
        self.catalog
            .get(id)
            .is_some_and(|l| self.catalog.is_locked(l, &self.progress.completed))
    }

    pub fn daily_goal(&self, target: u32) -> DailyGoal {
        self.progress.daily_goal(target)
    }

    pub fn board(&self) -> Vec<BoardEntry> {
        let current = self.current_lesson();
        self.catalog
            .lessons()
            .iter()
            .map(|lesson| {
                let status = if self.progress.is_completed(lesson.id) {
                    LessonStatus::Completed
                } else if self.catalog.is_locked(lesson, &self.progress.completed) {
                    LessonStatus::Locked
                } else if Some(lesson.id) == current {
                    LessonStatus::Current
                } else {
                    LessonStatus::Available
                };
                BoardEntry {
                    id: lesson.id,
                    title: lesson.title.clone(),
                    icon: lesson.icon.clone(),
                    xp: lesson.xp,
                    crown: lesson.crown,
                    playable: lesson.is_playable(),
                    status,
                }
            })
            .collect()
    }

    /// Question currently on screen, if any.
    pub fn current_question(&self) -> Option<QuestionView> {
        let (lesson, index) = match self.state {
            EngineState::InQuestion { lesson, index } => (lesson, index),
            EngineState::AnswerShown { lesson, index, .. } => (lesson, index),
            _ => return None,
        };
        let attempt = self.attempt.as_ref()?;
        let question = attempt.questions.get(index)?;
        Some(QuestionView::new(lesson, index, attempt.questions.len(), question))
    }

    // ─── Transitions ────────────────────────────────────────────────────────

    pub fn select_lesson(&mut self, id: LessonId) -> Result<LessonPreview, EngineError> {
        if !matches!(self.state, EngineState::Idle | EngineState::LessonComplete(_)) {
            return Err(self.invalid("select a lesson"));
        }
        let lesson = self
            .catalog
            .get(id)
            .ok_or(EngineError::UnknownLesson(id))?;
        if self.catalog.is_locked(lesson, &self.progress.completed) {
            warn!("Refusing locked lesson {} in '{}'", id, self.catalog.track());
            return Err(EngineError::LockedLesson(id));
        }

        let preview = LessonPreview {
            id,
            title: lesson.title.clone(),
            description: lesson.description.clone(),
            icon: lesson.icon.clone(),
            xp: lesson.xp,
            question_count: lesson.question_count(),
            content: lesson.content.clone(),
            crown: lesson.crown,
            completed: self.progress.is_completed(id),
        };
        self.attempt = None;
        self.state = EngineState::LessonPreview { lesson: id };
        debug!("Previewing lesson {}", id);
        Ok(preview)
    }

    pub fn start_lesson(&mut self) -> Result<QuestionView, EngineError> {
        let EngineState::LessonPreview { lesson: id } = self.state else {
            return Err(self.invalid("start a lesson"));
        };
        let lesson = self
            .catalog
            .get(id)
            .ok_or(EngineError::UnknownLesson(id))?;
        if !lesson.is_playable() {
            return Err(EngineError::EmptyLesson(id));
        }

        let attempt = Attempt {
            lesson: id,
            lesson_xp: lesson.xp,
            questions: lesson.questions.clone(),
            correct_answers: 0,
        };
        let view = QuestionView::new(id, 0, attempt.questions.len(), &attempt.questions[0]);
        self.attempt = Some(attempt);
        self.state = EngineState::InQuestion {
            lesson: id,
            index: 0,
        };
        debug!("Started lesson {} with {} questions", id, view.total);
        Ok(view)
    }

    pub fn submit_answer(&mut self, option_index: usize) -> Result<AnswerFeedback, EngineError> {
        let (lesson, index) = match self.state {
            EngineState::InQuestion { lesson, index } => (lesson, index),
            EngineState::AnswerShown { .. } => {
                warn!("Answer submitted twice for the same question");
                return Err(EngineError::AlreadyAnswered);
            }
            _ => return Err(self.invalid("submit an answer")),
        };
        let invalid = self.invalid("submit an answer");
        let attempt = self.attempt.as_mut().ok_or(invalid)?;
        let question = &attempt.questions[index];

        let option = question.options.get(option_index).ok_or_else(|| {
            warn!("Option {} out of range for question {}", option_index, index);
            EngineError::InvalidOptionIndex {
                index: option_index,
                count: question.options.len(),
            }
        })?;

        let correct = option.correct;
        let feedback = AnswerFeedback {
            correct,
            correct_option: question.correct_index(),
            explanation: if correct {
                None
            } else {
                question.explanation.clone()
            },
            is_last: index + 1 == attempt.questions.len(),
        };
        if correct {
            attempt.correct_answers += 1;
        }
        self.state = EngineState::AnswerShown {
            lesson,
            index,
            selected: option_index,
            correct,
        };
        Ok(feedback)
    }

    pub fn next_question(&mut self) -> Result<Step, EngineError> {
        let EngineState::AnswerShown { lesson, index, .. } = self.state else {
            return Err(self.invalid("advance to the next question"));
        };
        let invalid = self.invalid("advance to the next question");
        let attempt = self.attempt.take().ok_or(invalid)?;

        let next = index + 1;
        if next < attempt.questions.len() {
            let view = QuestionView::new(lesson, next, attempt.questions.len(), &attempt.questions[next]);
            self.attempt = Some(attempt);
            self.state = EngineState::InQuestion {
                lesson,
                index: next,
            };
            return Ok(Step::Question(view));
        }
        Ok(Step::Completed(self.complete(attempt)))
    }

    pub fn acknowledge_completion(&mut self) -> Result<(), EngineError> {
        if !matches!(self.state, EngineState::LessonComplete(_)) {
            return Err(self.invalid("acknowledge completion"));
        }
        self.state = EngineState::Idle;
        Ok(())
    }

    /// Close the lesson from any state. Counters of an unfinished attempt are
    /// discarded and nothing is persisted.
    pub fn abandon(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            debug!("Abandoned lesson {}", attempt.lesson);
        }
        self.state = EngineState::Idle;
    }

    /// Write the current progress again, e.g. after a failed completion save.
    pub fn retry_save(&mut self) -> Result<(), StoreError> {
        self.store.save(self.catalog.track(), &self.progress)?;
        self.pending_save = None;
        Ok(())
    }

    fn complete(&mut self, attempt: Attempt) -> CompletionOutcome {
        let total = attempt.questions.len();

        if self.progress.is_completed(attempt.lesson) {
            let summary = CompletionSummary {
                lesson: attempt.lesson,
                xp_earned: 0,
                correct_answers: attempt.correct_answers,
                total_questions: total,
                newly_completed: false,
                streak: self.progress.streak,
            };
            debug!("Lesson {} repeated; no rewards granted", attempt.lesson);
            self.state = EngineState::LessonComplete(summary);
            return CompletionOutcome {
                summary,
                saved: Ok(()),
            };
        }

        let xp = xp_earned(attempt.lesson_xp, attempt.correct_answers, total);
        self.progress.completed.insert(attempt.lesson);
        self.progress.xp += u64::from(xp);
        self.progress.leaderboard_progress += 1;

        let update = streak::record_activity(
            self.progress.last_activity,
            self.clock.today(),
            self.progress.streak,
        );
        if update.streak != self.progress.streak {
            info!("Streak is now {} day(s)", update.streak);
        }
        self.progress.streak = update.streak;
        self.progress.last_activity = update.last_activity;

        let next = self
            .catalog
            .next_after(attempt.lesson)
            .filter(|next| next.is_playable())
            .filter(|next| !self.catalog.is_locked(next, &self.progress.completed))
            .map(|next| next.id);
        if next.is_some() {
            self.progress.current_lesson = next;
        }

        info!(
            "Completed lesson {} in '{}': {}/{} correct, +{} XP",
            attempt.lesson,
            self.catalog.track(),
            attempt.correct_answers,
            total,
            xp
        );

        let summary = CompletionSummary {
            lesson: attempt.lesson,
            xp_earned: xp,
            correct_answers: attempt.correct_answers,
            total_questions: total,
            newly_completed: true,
            streak: self.progress.streak,
        };
        self.state = EngineState::LessonComplete(summary);

        let saved = self.store.save(self.catalog.track(), &self.progress);
        match &saved {
            Ok(()) => self.pending_save = None,
            Err(e) => warn!("Progress for '{}' not saved: {}", self.catalog.track(), e),
        }
        CompletionOutcome { summary, saved }
    }

    fn invalid(&self, action: &'static str) -> EngineError {
        EngineError::InvalidTransition {
            action,
            state: self.state.describe(),
        }
    }
}

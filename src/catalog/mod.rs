//! Ordered, read-only lesson catalogs and the unlock policy.

pub mod source;
pub mod tracks;

use std::collections::{BTreeSet, HashSet};

use crate::error::CatalogError;
use crate::models::{Lesson, LessonId};

pub use source::{CatalogSource, EmbeddedSource, FileSource, StaticSource};
pub use tracks::{Track, TrackRegistry};

/// Strictly ordered list of lessons for one track.
#[derive(Debug, Clone)]
pub struct LessonCatalog {
    track: String,
    title: String,
    lessons: Vec<Lesson>,
}

impl LessonCatalog {
    /// Validate and order the lessons by id.
    pub fn new(
        track: impl Into<String>,
        title: impl Into<String>,
        mut lessons: Vec<Lesson>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for lesson in &lessons {
            if !seen.insert(lesson.id) {
                return Err(CatalogError::DuplicateLesson(lesson.id));
            }
            validate_lesson(lesson)?;
        }
        lessons.sort_by_key(|l| l.id);

        Ok(Self {
            track: track.into(),
            title: title.into(),
            lessons,
        })
    }

    pub fn load(source: &dyn CatalogSource) -> Result<Self, CatalogError> {
        let lessons = source.list_lessons()?;
        Self::new(source.track(), source.title(), lessons)
    }

    pub fn track(&self) -> &str {
        &self.track
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn get(&self, id: LessonId) -> Option<&Lesson> {
        self.position(id).map(|i| &self.lessons[i])
    }

    pub fn first(&self) -> Option<&Lesson> {
        self.lessons.first()
    }

    pub fn next_after(&self, id: LessonId) -> Option<&Lesson> {
        self.position(id).and_then(|i| self.lessons.get(i + 1))
    }

    pub fn previous_of(&self, id: LessonId) -> Option<&Lesson> {
        match self.position(id) {
            Some(i) if i > 0 => self.lessons.get(i - 1),
            _ => None,
        }
    }

    /// A lesson is locked when it is flagged locked, has not been completed,
    /// and its predecessor in sequence has not been completed either.
    pub fn is_locked(&self, lesson: &Lesson, completed: &BTreeSet<LessonId>) -> bool {
        if !lesson.locked || completed.contains(&lesson.id) {
            return false;
        }
        match self.previous_of(lesson.id) {
            Some(prev) => !completed.contains(&prev.id),
            None => true,
        }
    }

    fn position(&self, id: LessonId) -> Option<usize> {
        self.lessons.binary_search_by_key(&id, |l| l.id).ok()
    }
}

fn validate_lesson(lesson: &Lesson) -> Result<(), CatalogError> {
    if lesson.xp == 0 {
        return Err(CatalogError::InvalidXp(lesson.id));
    }
    for (i, question) in lesson.questions.iter().enumerate() {
        let invalid = |reason: String| CatalogError::InvalidQuestion {
            lesson: lesson.id,
            question: i,
            reason,
        };
        let count = question.options.len();
        if !(2..=4).contains(&count) {
            return Err(invalid(format!("expected 2-4 options, found {}", count)));
        }
        let correct = question.options.iter().filter(|o| o.correct).count();
        if correct > 1 {
            return Err(invalid(format!("{} options flagged correct", correct)));
        }
    }
    Ok(())
}

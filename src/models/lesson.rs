use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable lesson identifier. Doubles as the sequence number inside a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(u32);

impl LessonId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LessonId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(LessonId::new)
            .map_err(|_| anyhow::anyhow!("Invalid lesson id: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

impl AnswerOption {
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    /// Shown after an incorrect selection
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    pub fn new(prompt: impl Into<String>, options: Vec<AnswerOption>) -> Self {
        Self {
            prompt: prompt.into(),
            options,
            explanation: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.correct)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub xp: u32,
    pub locked: bool,
    #[serde(default)]
    pub crown: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    /// Theory text shown before the questions start
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Lesson {
    pub fn new(id: u32, title: impl Into<String>, xp: u32) -> Self {
        Self {
            id: LessonId::new(id),
            title: title.into(),
            xp,
            locked: false,
            crown: false,
            description: String::new(),
            icon: String::new(),
            content: None,
            questions: Vec::new(),
        }
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    /// Placeholder lessons ship without questions and can never be played.
    pub fn is_playable(&self) -> bool {
        !self.questions.is_empty()
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_id_parses_and_displays() {
        let id: LessonId = " 4 ".parse().unwrap();
        assert_eq!(id, LessonId::new(4));
        assert_eq!(id.to_string(), "4");
        assert!("four".parse::<LessonId>().is_err());
    }

    #[test]
    fn correct_index_finds_flagged_option() {
        let q = Question::new(
            "Кое време изразява действие, което се извършва в момента?",
            vec![
                AnswerOption::new("Минало свършено време", false),
                AnswerOption::new("Сегашно време", true),
            ],
        );
        assert_eq!(q.correct_index(), Some(1));
    }

    #[test]
    fn lesson_without_questions_is_not_playable() {
        let lesson = Lesson::new(4, "Медиен текст", 15).locked(true);
        assert!(!lesson.is_playable());
        assert_eq!(lesson.question_count(), 0);
    }
}

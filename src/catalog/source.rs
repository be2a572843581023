use serde::Deserialize;
use std::path::PathBuf;

use crate::error::CatalogError;
use crate::models::{Lesson, LessonId, Question};

/// Supplies the lessons of one track. Implementations are read-only.
pub trait CatalogSource {
    fn track(&self) -> &str;
    fn title(&self) -> &str;
    fn list_lessons(&self) -> Result<Vec<Lesson>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    lessons: Vec<RawLesson>,
}

#[derive(Debug, Deserialize)]
struct RawLesson {
    id: u32,
    title: String,
    xp: u32,
    locked: Option<bool>,
    #[serde(default)]
    crown: bool,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
    content: Option<String>,
    #[serde(default)]
    questions: Vec<Question>,
}

/// Parse the TOML catalog format.
///
/// `locked` defaults from position: the first lesson in sequence is open,
/// every later one starts locked.
pub fn parse_catalog(text: &str) -> Result<Vec<Lesson>, CatalogError> {
    let file: CatalogFile = toml::from_str(text)?;
    let first_id = file.lessons.iter().map(|l| l.id).min();

    let lessons = file
        .lessons
        .into_iter()
        .map(|raw| {
            let locked = raw.locked.unwrap_or(Some(raw.id) != first_id);
            Lesson {
                id: LessonId::new(raw.id),
                title: raw.title,
                xp: raw.xp,
                locked,
                crown: raw.crown,
                description: raw.description,
                icon: raw.icon,
                content: raw.content.map(|c| c.trim().to_string()),
                questions: raw.questions,
            }
        })
        .collect();
    Ok(lessons)
}

/// Catalog compiled into the binary.
pub struct EmbeddedSource {
    track: &'static str,
    title: &'static str,
    text: &'static str,
}

impl EmbeddedSource {
    pub const fn new(track: &'static str, title: &'static str, text: &'static str) -> Self {
        Self { track, title, text }
    }
}

impl CatalogSource for EmbeddedSource {
    fn track(&self) -> &str {
        self.track
    }

    fn title(&self) -> &str {
        self.title
    }

    fn list_lessons(&self) -> Result<Vec<Lesson>, CatalogError> {
        parse_catalog(self.text)
    }
}

/// Catalog read from a TOML file on disk.
pub struct FileSource {
    track: String,
    title: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(track: impl Into<String>, title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            track: track.into(),
            title: title.into(),
            path: path.into(),
        }
    }
}

impl CatalogSource for FileSource {
    fn track(&self) -> &str {
        &self.track
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn list_lessons(&self) -> Result<Vec<Lesson>, CatalogError> {
        log::debug!("Reading catalog for '{}' from {:?}", self.track, self.path);
        let text = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        parse_catalog(&text)
    }
}

/// Lessons already held in memory.
pub struct StaticSource {
    track: String,
    title: String,
    lessons: Vec<Lesson>,
}

impl StaticSource {
    pub fn new(track: impl Into<String>, title: impl Into<String>, lessons: Vec<Lesson>) -> Self {
        Self {
            track: track.into(),
            title: title.into(),
            lessons,
        }
    }
}

impl CatalogSource for StaticSource {
    fn track(&self) -> &str {
        &self.track
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn list_lessons(&self) -> Result<Vec<Lesson>, CatalogError> {
        Ok(self.lessons.clone())
    }
}

use std::path::PathBuf;

use crate::catalog::source::{CatalogSource, EmbeddedSource, FileSource};
use crate::catalog::LessonCatalog;
use crate::error::CatalogError;

static BULGARIAN: EmbeddedSource = EmbeddedSource::new(
    "bulgarian",
    "Български език",
    include_str!("data/bulgarian.toml"),
);

static LITERATURE: EmbeddedSource = EmbeddedSource::new(
    "literature",
    "Литература",
    include_str!("data/literature.toml"),
);

#[derive(Debug, Clone)]
enum TrackOrigin {
    Builtin,
    File(PathBuf),
}

/// A course the learner can study, with its own independent progress.
#[derive(Debug, Clone)]
pub struct Track {
    pub key: String,
    pub title: String,
    origin: TrackOrigin,
}

impl Track {
    pub fn path(&self) -> Option<&PathBuf> {
        match &self.origin {
            TrackOrigin::File(path) => Some(path),
            TrackOrigin::Builtin => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrackRegistry {
    tracks: Vec<Track>,
}

impl TrackRegistry {
    pub fn with_builtins() -> Self {
        let tracks = [&BULGARIAN, &LITERATURE]
            .into_iter()
            .map(|source| Track {
                key: source.track().to_string(),
                title: source.title().to_string(),
                origin: TrackOrigin::Builtin,
            })
            .collect();
        Self { tracks }
    }

    /// Register a file-backed track. A key that is already known gets replaced.
    pub fn add_file(&mut self, key: &str, title: &str, path: impl Into<PathBuf>) {
        let track = Track {
            key: key.to_string(),
            title: title.to_string(),
            origin: TrackOrigin::File(path.into()),
        };
        match self.tracks.iter_mut().find(|t| t.key == key) {
            Some(existing) => *existing = track,
            None => self.tracks.push(track),
        }
    }

    pub fn list(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, key: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.key == key)
    }

    pub fn open(&self, key: &str) -> Result<LessonCatalog, CatalogError> {
        let track = self
            .get(key)
            .ok_or_else(|| CatalogError::UnknownTrack(key.to_string()))?;
        match &track.origin {
            TrackOrigin::Builtin => {
                let source = [&BULGARIAN, &LITERATURE]
                    .into_iter()
                    .find(|s| s.track() == key)
                    .ok_or_else(|| CatalogError::UnknownTrack(key.to_string()))?;
                LessonCatalog::load(source)
            }
            TrackOrigin::File(path) => {
                let source = FileSource::new(&track.key, &track.title, path);
                LessonCatalog::load(&source)
            }
        }
    }
}

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::TrackRegistry;

fn default_track() -> String {
    "bulgarian".to_string()
}
fn default_daily_lesson_goal() -> u32 {
    3
}
fn default_daily_xp_goal() -> u32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerConfig {
    #[serde(default = "default_track")]
    pub default_track: String,
    /// Lessons per goal cycle shown on the leaderboard bar
    #[serde(default = "default_daily_lesson_goal")]
    pub daily_lesson_goal: u32,
    #[serde(default = "default_daily_xp_goal")]
    pub daily_xp_goal: u32,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            default_track: default_track(),
            daily_lesson_goal: default_daily_lesson_goal(),
            daily_xp_goal: default_daily_xp_goal(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Overrides `<data_dir>/matura.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

/// Extra lesson catalog loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    pub key: String,
    pub title: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub learner: LearnerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tracks: Vec<TrackConfig>,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "matura")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("matura.db")),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    /// Make sure the database's parent directory exists.
    pub fn ensure_db_dir(&self) -> Result<PathBuf> {
        let path = self.db_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating data directory {:?}", parent))?;
        }
        Ok(path)
    }

    /// Built-in tracks plus the ones declared under `[[tracks]]`.
    pub fn track_registry(&self) -> TrackRegistry {
        let mut registry = TrackRegistry::with_builtins();
        for track in &self.tracks {
            registry.add_file(&track.key, &track.title, &track.path);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.learner.default_track, "bulgarian");
        assert_eq!(config.learner.daily_lesson_goal, 3);
        assert_eq!(config.learner.daily_xp_goal, 20);
        assert!(config.tracks.is_empty());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[learner]
default_track = "literature"

[storage]
db_path = "/tmp/matura-test.db"

[[tracks]]
key = "history"
title = "История"
path = "/tmp/history.toml"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.learner.default_track, "literature");
        assert_eq!(config.learner.daily_lesson_goal, 3);
        assert_eq!(config.db_path().unwrap(), PathBuf::from("/tmp/matura-test.db"));

        let registry = config.track_registry();
        assert_eq!(registry.list().len(), 3);
        assert!(registry.get("history").is_some());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.learner.daily_lesson_goal = 5;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.learner.daily_lesson_goal, 5);
        assert!(loaded.storage.db_path.is_none());
    }
}

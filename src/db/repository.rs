use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::db::migrations::run_migrations;
use crate::error::StoreError;
use crate::models::{LessonId, ProgressState};
use crate::store::ProgressStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(s: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("bad date '{}': {}", s, e)))
}

fn to_u32(value: i64, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{} out of range: {}", column, value)))
}

// ─── Progress repo ──────────────────────────────────────────────────────────

pub struct ProgressRepo;

impl ProgressRepo {
    pub fn get(conn: &Connection, track: &str) -> Result<ProgressState, StoreError> {
        let row = conn
            .query_row(
                "SELECT xp, leaderboard_progress, streak, last_activity, current_lesson
                 FROM progress WHERE track = ?1",
                params![track],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<i64>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((xp, leaderboard, streak, last_activity, current_lesson)) = row else {
            return Ok(ProgressState::default());
        };

        let mut stmt = conn.prepare(
            "SELECT lesson_id FROM completed_lessons WHERE track = ?1 ORDER BY lesson_id",
        )?;
        let ids = stmt
            .query_map(params![track], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut state = ProgressState {
            xp: u64::try_from(xp).map_err(|_| StoreError::Corrupt(format!("xp out of range: {}", xp)))?,
            leaderboard_progress: to_u32(leaderboard, "leaderboard_progress")?,
            streak: to_u32(streak, "streak")?,
            last_activity: last_activity.as_deref().map(parse_date).transpose()?,
            current_lesson: current_lesson
                .map(|id| to_u32(id, "current_lesson").map(LessonId::new))
                .transpose()?,
            ..ProgressState::default()
        };
        for id in ids {
            state.completed.insert(LessonId::new(to_u32(id, "lesson_id")?));
        }
        Ok(state)
    }

    /// Replace everything stored for the track in one transaction.
    pub fn put(conn: &Connection, track: &str, state: &ProgressState) -> Result<(), StoreError> {
        let tx = conn.unchecked_transaction()?;
        let xp = i64::try_from(state.xp)
            .map_err(|_| StoreError::Corrupt(format!("xp out of range: {}", state.xp)))?;
        tx.execute(
            "INSERT INTO progress (track, xp, leaderboard_progress, streak, last_activity, current_lesson, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
             ON CONFLICT(track) DO UPDATE SET
                xp = ?2, leaderboard_progress = ?3, streak = ?4,
                last_activity = ?5, current_lesson = ?6, updated_at = datetime('now')",
            params![
                track,
                xp,
                state.leaderboard_progress,
                state.streak,
                state.last_activity.map(|d| d.format(DATE_FORMAT).to_string()),
                state.current_lesson.map(|id| id.value()),
            ],
        )?;

        // Keep the existing completion timestamps of lessons that stay completed
        let mut stmt = tx.prepare("SELECT lesson_id FROM completed_lessons WHERE track = ?1")?;
        let existing = stmt
            .query_map(params![track], |row| row.get::<_, u32>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        drop(stmt);

        for id in existing {
            if !state.completed.contains(&LessonId::new(id)) {
                tx.execute(
                    "DELETE FROM completed_lessons WHERE track = ?1 AND lesson_id = ?2",
                    params![track, id],
                )?;
            }
        }
        for id in &state.completed {
            tx.execute(
                "INSERT OR IGNORE INTO completed_lessons (track, lesson_id) VALUES (?1, ?2)",
                params![track, id.value()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn delete(conn: &Connection, track: &str) -> Result<(), StoreError> {
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM completed_lessons WHERE track = ?1", params![track])?;
        tx.execute("DELETE FROM progress WHERE track = ?1", params![track])?;
        tx.commit()?;
        Ok(())
    }

    /// Tracks that have any stored progress.
    pub fn tracks(conn: &Connection) -> Result<Vec<String>, StoreError> {
        let mut stmt = conn.prepare("SELECT track FROM progress ORDER BY track")?;
        let tracks = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tracks)
    }
}

// ─── SQLite store ───────────────────────────────────────────────────────────

/// `ProgressStore` backed by a SQLite database.
pub struct SqliteProgressStore {
    conn: Connection,
}

impl SqliteProgressStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        // WAL only applies to file databases
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Tracks that have stored progress, whether or not they are still configured.
    pub fn stored_tracks(&self) -> Result<Vec<String>, StoreError> {
        ProgressRepo::tracks(&self.conn)
    }
}

impl ProgressStore for SqliteProgressStore {
    fn load(&self, track: &str) -> Result<ProgressState, StoreError> {
        ProgressRepo::get(&self.conn, track)
    }

    fn save(&self, track: &str, state: &ProgressState) -> Result<(), StoreError> {
        ProgressRepo::put(&self.conn, track, state)
    }

    fn reset(&self, track: &str) -> Result<(), StoreError> {
        ProgressRepo::delete(&self.conn, track)
    }
}

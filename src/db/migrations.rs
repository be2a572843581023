use rusqlite::Connection;

use crate::error::StoreError;

pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS progress (
            track                 TEXT PRIMARY KEY,
            xp                    INTEGER NOT NULL DEFAULT 0 CHECK(xp >= 0),
            leaderboard_progress  INTEGER NOT NULL DEFAULT 0 CHECK(leaderboard_progress >= 0),
            streak                INTEGER NOT NULL DEFAULT 0 CHECK(streak >= 0),
            last_activity         TEXT,
            current_lesson        INTEGER,
            updated_at            TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS completed_lessons (
            track         TEXT NOT NULL,
            lesson_id     INTEGER NOT NULL,
            completed_at  TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (track, lesson_id)
        );
    ")?;
    Ok(())
}

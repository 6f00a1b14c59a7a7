//! SQLite storage layer for levels, attempts and settings

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::migrations::run_migrations;
use crate::types::{
    AttemptId, AttemptRecord, DEFAULT_PASS_SCORE, Level, LevelId, LevelProgress, NewAttempt,
};

/// Levels, attempts and settings in one SQLite file
pub struct Storage {
    conn: Mutex<Connection>,
}

/// Level the learner had selected when the app was last closed
pub const SETTING_CURRENT_LEVEL: &str = "current_level";

/// Number of attempts returned by history queries unless asked otherwise
pub const RECENT_ATTEMPTS_LIMIT: usize = 20;

/// Levels inserted into an empty database: (title, text, audio, pass_score)
const SEED_LEVELS: &[(&str, &str, &str, i64)] = &[
    (
        "Level 1",
        "The quick brown fox jumps over the lazy dog.",
        "audio/l1.mp3",
        90,
    ),
    (
        "Level 2",
        "I enjoy learning English through daily dictation practice.",
        "audio/l2.mp3",
        90,
    ),
    (
        "Level 3",
        "Consistency beats intensity when building long-term skills.",
        "audio/l3.mp3",
        90,
    ),
];

impl Storage {
    /// Open the database at `path`, creating and seeding it on first use
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Fresh seeded database that lives only as long as the value
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Apply migrations and seed the default levels into an empty database
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        run_migrations(&conn)?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM levels", [], |row| row.get(0))?;
        if count == 0 {
            for (title, text, audio, pass_score) in SEED_LEVELS {
                conn.execute(
                    "INSERT INTO levels (title, text, audio, pass_score) VALUES (?1, ?2, ?3, ?4)",
                    params![title, text, audio, pass_score],
                )?;
            }
            info!("Seeded {} levels", SEED_LEVELS.len());
        } else {
            debug!("Levels already exist ({}), skip seeding", count);
        }

        debug!("Level database ready");
        Ok(())
    }

    // ========== Levels ==========

    /// All levels in play order
    pub fn get_levels(&self) -> Result<Vec<Level>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, title, text, audio, pass_score FROM levels ORDER BY id")?;

        let levels = stmt
            .query_map([], level_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(levels)
    }

    pub fn get_level(&self, id: LevelId) -> Result<Level> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, text, audio, pass_score FROM levels WHERE id = ?1",
            params![id],
            level_from_row,
        )
        .optional()?
        .ok_or(Error::LevelNotFound(id))
    }

    /// Append a level after the existing ones, returning its id
    ///
    /// `pass_score` defaults to [`DEFAULT_PASS_SCORE`].
    pub fn add_level(
        &self,
        title: &str,
        text: &str,
        audio: Option<&str>,
        pass_score: Option<i64>,
    ) -> Result<LevelId> {
        let pass_score = pass_score.unwrap_or(DEFAULT_PASS_SCORE);
        if !(0..=100).contains(&pass_score) {
            return Err(Error::Config(format!(
                "pass score {} is outside 0..=100",
                pass_score
            )));
        }

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO levels (title, text, audio, pass_score) VALUES (?1, ?2, ?3, ?4)",
            params![title, text, audio, pass_score],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Added level {} ({})", id, title);
        Ok(id)
    }

    // ========== Attempts ==========

    /// Persist an attempt, returning its id
    pub fn save_attempt(&self, attempt: &NewAttempt) -> Result<AttemptId> {
        attempt.validate()?;

        let conn = self.conn.lock();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM levels WHERE id = ?1)",
            params![attempt.level_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(Error::LevelNotFound(attempt.level_id));
        }

        conn.execute(
            r#"
            INSERT INTO attempts (level_id, accuracy, ok, wrong, missing, extra, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                attempt.level_id,
                attempt.accuracy,
                attempt.ok,
                attempt.wrong,
                attempt.missing,
                attempt.extra,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(
            "Saved attempt {} for level {} ({}%)",
            id, attempt.level_id, attempt.accuracy
        );
        Ok(id)
    }

    /// Most recent attempts for a level, newest first
    pub fn get_recent_attempts(
        &self,
        level_id: LevelId,
        limit: usize,
    ) -> Result<Vec<AttemptRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, level_id, accuracy, ok, wrong, missing, extra, created_at
            FROM attempts
            WHERE level_id = ?1
            ORDER BY id DESC
            LIMIT ?2
            "#,
        )?;

        let attempts = stmt
            .query_map(params![level_id, limit as i64], |row| {
                let created_at_str: String = row.get(7)?;
                Ok(AttemptRecord {
                    id: row.get(0)?,
                    level_id: row.get(1)?,
                    accuracy: row.get(2)?,
                    ok: row.get(3)?,
                    wrong: row.get(4)?,
                    missing: row.get(5)?,
                    extra: row.get(6)?,
                    created_at: DateTime::parse_from_rfc3339(&created_at_str)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(attempts)
    }

    /// Highest accuracy ever reached on a level
    pub fn best_accuracy(&self, level_id: LevelId) -> Result<Option<u32>> {
        let conn = self.conn.lock();
        let best: Option<u32> = conn.query_row(
            "SELECT MAX(accuracy) FROM attempts WHERE level_id = ?1",
            params![level_id],
            |row| row.get(0),
        )?;
        Ok(best)
    }

    /// Whether any attempt reached the level's pass score
    pub fn has_passed(&self, level_id: LevelId) -> Result<bool> {
        let conn = self.conn.lock();
        let passed: bool = conn.query_row(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM attempts a JOIN levels l ON l.id = a.level_id
                WHERE a.level_id = ?1 AND a.accuracy >= l.pass_score
            )
            "#,
            params![level_id],
            |row| row.get(0),
        )?;
        Ok(passed)
    }

    /// Every level with its best accuracy and passed flag, in play order
    pub fn get_level_progress(&self) -> Result<Vec<LevelProgress>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT l.id, l.title, l.text, l.audio, l.pass_score,
                   MAX(a.accuracy),
                   COALESCE(MAX(a.accuracy >= l.pass_score), 0)
            FROM levels l
            LEFT JOIN attempts a ON a.level_id = l.id
            GROUP BY l.id
            ORDER BY l.id
            "#,
        )?;

        let progress = stmt
            .query_map([], |row| {
                Ok(LevelProgress {
                    level: level_from_row(row)?,
                    best_accuracy: row.get(5)?,
                    passed: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(progress)
    }

    /// Delete every attempt and restart attempt ids from 1
    pub fn reset_attempts(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM attempts", [])?;
        conn.execute("DELETE FROM sqlite_sequence WHERE name = 'attempts'", [])?;
        info!("Reset progress, deleted {} attempts", deleted);
        Ok(deleted)
    }

    pub fn get_attempt_count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM attempts", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ========== Settings ==========

    /// Upsert a key/value setting
    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Get a setting value
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(Into::into)
    }
}

fn level_from_row(row: &Row<'_>) -> rusqlite::Result<Level> {
    Ok(Level {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        audio: row.get(3)?,
        pass_score: row.get::<_, Option<i64>>(4)?.unwrap_or(DEFAULT_PASS_SCORE),
    })
}

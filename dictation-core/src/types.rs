//! Core types used throughout the dictation engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scoring::ScoreSummary;

/// Unique identifier for levels
pub type LevelId = i64;

/// Unique identifier for attempts
pub type AttemptId = i64;

/// Pass threshold used when a level does not specify one
pub const DEFAULT_PASS_SCORE: i64 = 90;

/// A dictation level: one reference sentence with its audio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub title: String,
    pub text: String,
    /// Audio path relative to the static asset root (e.g. "audio/l1.mp3")
    pub audio: Option<String>,
    pub pass_score: i64,
}

/// A level together with the learner's progress on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    #[serde(flatten)]
    pub level: Level,
    pub best_accuracy: Option<u32>,
    pub passed: bool,
}

/// Attempt payload before it is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttempt {
    pub level_id: LevelId,
    pub accuracy: u32,
    pub ok: u32,
    pub wrong: u32,
    pub missing: u32,
    pub extra: u32,
}

impl NewAttempt {
    pub fn from_summary(level_id: LevelId, summary: &ScoreSummary) -> Self {
        Self {
            level_id,
            accuracy: summary.accuracy,
            ok: summary.ok,
            wrong: summary.wrong,
            missing: summary.missing,
            extra: summary.extra,
        }
    }

    /// Reject payloads a scorer could never have produced
    pub fn validate(&self) -> Result<()> {
        if self.accuracy > 100 {
            return Err(Error::InvalidAttempt(format!(
                "accuracy {} is above 100",
                self.accuracy
            )));
        }
        Ok(())
    }
}

/// A persisted attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: AttemptId,
    pub level_id: LevelId,
    pub accuracy: u32,
    pub ok: u32,
    pub wrong: u32,
    pub missing: u32,
    pub extra: u32,
    pub created_at: DateTime<Utc>,
}

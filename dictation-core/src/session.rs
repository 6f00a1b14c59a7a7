//! Practice session: level selection, typing, checking and progression

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::grid::LetterGrid;
use crate::progress::{is_unlocked, next_level_after, resolve_current};
use crate::scoring::{Evaluation, evaluate};
use crate::storage::{RECENT_ATTEMPTS_LIMIT, SETTING_CURRENT_LEVEL, Storage};
use crate::types::{AttemptId, AttemptRecord, Level, LevelId, LevelProgress, NewAttempt};

/// Result of checking the typed answer for the current level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub level_id: LevelId,
    pub attempt_id: AttemptId,
    pub evaluation: Evaluation,
    pub passed: bool,
    /// Level the session moved on to after a pass
    pub next_level_id: Option<LevelId>,
}

/// One learner working through the level list
pub struct DictationSession {
    storage: Arc<Storage>,
    levels: Vec<LevelProgress>,
    current: Option<LevelId>,
    grid: LetterGrid,
}

impl DictationSession {
    /// Load levels and restore the last selected level when it is still playable
    pub fn new(storage: Arc<Storage>) -> Result<Self> {
        let saved = storage
            .get_setting(SETTING_CURRENT_LEVEL)?
            .and_then(|v| v.parse::<LevelId>().ok());

        let mut session = Self {
            storage,
            levels: Vec::new(),
            current: saved,
            grid: LetterGrid::default(),
        };
        session.reload()?;

        info!(
            "Session started with {} levels, current level {:?}",
            session.levels.len(),
            session.current
        );
        Ok(session)
    }

    /// Refresh progress from storage and re-resolve the current level
    ///
    /// Clears the typed answer.
    pub fn reload(&mut self) -> Result<()> {
        self.levels = self.storage.get_level_progress()?;

        let resolved = resolve_current(&self.levels, self.current);
        if resolved != self.current {
            debug!("Current level {:?} -> {:?}", self.current, resolved);
        }
        self.set_current(resolved)
    }

    pub fn levels(&self) -> &[LevelProgress] {
        &self.levels
    }

    pub fn is_unlocked(&self, id: LevelId) -> bool {
        is_unlocked(&self.levels, id)
    }

    pub fn current_level_id(&self) -> Option<LevelId> {
        self.current
    }

    pub fn current_level(&self) -> Option<&Level> {
        let id = self.current?;
        self.levels
            .iter()
            .find(|l| l.level.id == id)
            .map(|l| &l.level)
    }

    /// Switch to another level and start with an empty answer
    pub fn select_level(&mut self, id: LevelId) -> Result<()> {
        if !self.levels.iter().any(|l| l.level.id == id) {
            return Err(Error::LevelNotFound(id));
        }
        if !self.is_unlocked(id) {
            return Err(Error::LevelLocked(id));
        }
        self.set_current(Some(id))
    }

    /// Persists the selection before touching in-memory state
    fn set_current(&mut self, id: Option<LevelId>) -> Result<()> {
        if let Some(id) = id {
            self.storage
                .set_setting(SETTING_CURRENT_LEVEL, &id.to_string())?;
        }

        self.current = id;
        self.grid = match self.current_level() {
            Some(level) => LetterGrid::new(&level.text),
            None => LetterGrid::default(),
        };
        Ok(())
    }

    pub fn grid(&self) -> &LetterGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut LetterGrid {
        &mut self.grid
    }

    /// Score the typed answer, record the attempt and advance on a pass
    pub fn check(&mut self) -> Result<CheckOutcome> {
        let level = self.current_level().cloned().ok_or(Error::NoLevelSelected)?;

        let user_text = self.grid.user_text();
        let evaluation = evaluate(self.grid.reference(), &user_text, level.pass_score);
        let passed = evaluation.summary.passed;

        let attempt_id = self
            .storage
            .save_attempt(&NewAttempt::from_summary(level.id, &evaluation.summary))?;

        if passed {
            info!(
                "Passed {} ({}% >= {}%)",
                level.title, evaluation.summary.accuracy, level.pass_score
            );
        } else {
            info!(
                "Try again on {}: {}% / requires {}%",
                level.title, evaluation.summary.accuracy, level.pass_score
            );
        }

        // attempt is already stored; a failed refresh only skips the advance
        let mut next_level_id = None;
        match self.reload() {
            Ok(()) => {
                if passed && let Some(next) = next_level_after(&self.levels, level.id) {
                    match self.select_level(next) {
                        Ok(()) => next_level_id = Some(next),
                        Err(e) => warn!("Could not advance to level {}: {}", next, e),
                    }
                }
            }
            Err(e) => warn!("Attempt {} saved, refresh failed: {}", attempt_id, e),
        }

        Ok(CheckOutcome {
            level_id: level.id,
            attempt_id,
            evaluation,
            passed,
            next_level_id,
        })
    }

    /// Most recent attempts for a level, newest first
    pub fn attempts(&self, level_id: LevelId) -> Result<Vec<AttemptRecord>> {
        self.storage
            .get_recent_attempts(level_id, RECENT_ATTEMPTS_LIMIT)
    }

    /// Forget every attempt; locked levels fall back to the first level
    pub fn reset_progress(&mut self) -> Result<usize> {
        let deleted = self.storage.reset_attempts()?;
        self.reload()?;
        Ok(deleted)
    }
}

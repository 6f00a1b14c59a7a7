//! Level unlocking and progression
//!
//! The first level is always open; every other level opens once the level
//! before it has been passed.

use crate::types::{LevelId, LevelProgress};

/// Whether a level can be played
///
/// Unknown ids are treated like the first level.
pub fn is_unlocked(levels: &[LevelProgress], id: LevelId) -> bool {
    match levels.iter().position(|l| l.level.id == id) {
        None | Some(0) => true,
        Some(idx) => levels[idx - 1].passed,
    }
}

pub fn first_unlocked(levels: &[LevelProgress]) -> Option<LevelId> {
    levels
        .iter()
        .find(|l| is_unlocked(levels, l.level.id))
        .map(|l| l.level.id)
}

/// The level to move on to after `id`, if `id` has been passed
pub fn next_level_after(levels: &[LevelProgress], id: LevelId) -> Option<LevelId> {
    let idx = levels.iter().position(|l| l.level.id == id)?;
    if !levels[idx].passed {
        return None;
    }
    levels.get(idx + 1).map(|l| l.level.id)
}

/// Keep `current` when it is still playable, otherwise fall back to the first
/// unlocked level, then to the first level
pub fn resolve_current(levels: &[LevelProgress], current: Option<LevelId>) -> Option<LevelId> {
    let first = levels.first().map(|l| l.level.id);
    let current = current
        .filter(|id| levels.iter().any(|l| l.level.id == *id))
        .or(first)?;

    if is_unlocked(levels, current) {
        Some(current)
    } else {
        first_unlocked(levels).or(first)
    }
}

//! Error types for the dictation engine

use thiserror::Error;

/// Result type alias using the engine's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised around the scoring core (the core itself is total)
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Level not found: {0}")]
    LevelNotFound(i64),

    #[error("No level selected")]
    NoLevelSelected,

    #[error("Level is locked: {0}")]
    LevelLocked(i64),

    #[error("Invalid attempt: {0}")]
    InvalidAttempt(String),
}

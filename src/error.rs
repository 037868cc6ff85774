//! Errors raised at the edges of the engine: level layouts and configuration
//! documents. Nothing inside a tick can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("unknown level: {0}")]
    UnknownLevel(u32),

    #[error("layout has no rows")]
    Empty,

    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown character {ch:?} at ({x},{y})")]
    UnknownCharacter { ch: char, x: usize, y: usize },

    #[error("layout has no player start tile ('P')")]
    MissingPlayerStart,

    #[error("layout has no ghost home tile ('G')")]
    MissingGhostHome,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

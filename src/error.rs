//! Error types for gridcaster
//!
//! Every variant is raised while loading assets or configuration. Once a
//! [`crate::Simulation`] exists, ticking and casting cannot fail.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse asset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("grid has no cells")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("cell ({col}, {row}) has invalid code {value}")]
    InvalidCode { col: usize, row: usize, value: i64 },

    #[error("grid must contain exactly one spawn marker, found {0}")]
    SpawnCount(usize),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("camera start ({x}, {y}) lies in a blocking cell")]
    BlockedStart { x: f64, y: f64 },
}

pub type Result<T> = std::result::Result<T, GridError>;

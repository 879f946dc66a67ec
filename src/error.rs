/// Error taxonomy.
///
/// Nothing here is fatal to the game loop: storage and leaderboard errors
/// are reported to the player as notices, simulation errors are logged and
/// folded into a forced game over.

use thiserror::Error;

/// Key-value or file-backed storage failure.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

/// Failure of a leaderboard operation.
#[derive(Error, Debug)]
pub enum LeaderboardError {
    /// Malformed submission. The player may correct it and retry.
    #[error("invalid submission: {0}")]
    Validation(String),

    /// Backend unreachable or failing. Local state is unaffected.
    #[error("leaderboard storage failed: {0}")]
    Storage(#[from] StoreError),
}

/// A state the simulation should never reach.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationError {
    #[error("no free cell left for food")]
    NoFreeCell,
}

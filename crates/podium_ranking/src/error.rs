//! # Ranking Error Types
//!
//! Core operations are infallible. Errors only come from configuration
//! and from the consistency checker.

use thiserror::Error;

use crate::player::Score;

/// Errors that can occur around the ranking engine.
#[derive(Error, Debug)]
pub enum RankingError {
    /// Configuration values rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read.
    #[error("failed to read config '{path}': {source}")]
    ConfigIo {
        /// Path of the config file.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config '{path}': {source}")]
    ConfigParse {
        /// Path of the config file (or `<inline>`).
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A player's table score and bucket membership disagree.
    #[error("inconsistent player '{player}': {detail}")]
    Inconsistent {
        /// The offending player.
        player: String,
        /// What was found.
        detail: String,
    },

    /// A bucket without members is still linked in the index.
    #[error("empty bucket left in index at score {0}")]
    OrphanBucket(Score),
}

/// Result type for ranking operations.
pub type RankingResult<T> = Result<T, RankingError>;

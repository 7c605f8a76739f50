//! # PODIUM Ranking Engine
//!
//! Thread-safe real-time leaderboard: many writers update player scores
//! while readers keep asking for the top of the board.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        RankingEngine                         │
//! │                                                              │
//! │   LockStripes ─── one mutex per key slot (update arbiter)    │
//! │                                                              │
//! │   ┌────────────────────┐        ┌─────────────────────────┐  │
//! │   │  PlayerScoreTable  │        │       ScoreIndex        │  │
//! │   │  player -> score   │        │  score -> {players}     │  │
//! │   │  (sharded RwLock)  │        │  (bucket Mutex each)    │  │
//! │   └────────────────────┘        └─────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. **Every scored player sits in exactly one bucket** - the one matching
//!    its table score, once its update call has returned
//! 2. **No empty bucket survives** - the last member out unlinks it
//! 3. **No global lock** - same-player updates serialize on a stripe,
//!    everything else only meets on a bucket or a shard
//!
//! ## Example
//!
//! ```rust
//! use podium_ranking::RankingEngine;
//!
//! let board = RankingEngine::new();
//! board.update_score("A", 10);
//! board.update_score("B", 10);
//!
//! // Ties are ordered by player id
//! assert_eq!(board.top_n(2), vec!["A", "B"]);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod player;
pub mod stripes;
pub mod table;

pub use config::RankingConfig;
pub use engine::{RankingEngine, DEFAULT_SCORE};
pub use error::{RankingError, RankingResult};
pub use index::ScoreIndex;
pub use player::{PlayerId, RankedEntry, Score};
pub use stripes::LockStripes;
pub use table::PlayerScoreTable;

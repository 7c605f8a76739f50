//! # Ranking Engine
//!
//! The facade that owns a [`PlayerScoreTable`] and a [`ScoreIndex`] and is
//! the only place either is mutated.
//!
//! ## Update Protocol
//!
//! ```text
//!   update_score(p, new)
//!     │
//!     ├─ lock stripe(p)                 ── arbitration point for p
//!     ├─ prev = table.set(p, new)
//!     ├─ prev != new ? index.remove_member(prev, p)
//!     ├─ index.add_member(new, p)
//!     └─ unlock stripe(p)
//! ```
//!
//! Two updates of the same player run back to back on its stripe, so the
//! `prev` each one observes is exactly the bucket it has to vacate. The
//! last update to take the stripe wins both the table and the index.
//!
//! Readers never touch the stripes. They see a weakly consistent board:
//! a concurrent update may or may not be visible.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::config::RankingConfig;
use crate::error::{RankingError, RankingResult};
use crate::index::ScoreIndex;
use crate::player::{PlayerId, RankedEntry, Score};
use crate::stripes::LockStripes;
use crate::table::PlayerScoreTable;

/// Score reported for players that were never scored.
pub const DEFAULT_SCORE: Score = 0;

/// Thread-safe real-time leaderboard.
///
/// `RankingEngine` is `Send + Sync`; share it with `Arc`. Independent
/// engines do not share any state.
///
/// ## Usage
///
/// ```rust
/// use podium_ranking::RankingEngine;
///
/// let board = RankingEngine::new();
/// board.update_score("A", 10);
/// board.update_score("B", 20);
/// board.update_score("A", 25);
///
/// assert_eq!(board.top_n(2), vec!["A", "B"]);
/// assert_eq!(board.score_of("A"), 25);
/// assert_eq!(board.total_players(), 2);
/// ```
pub struct RankingEngine {
    table: PlayerScoreTable,
    index: ScoreIndex,
    stripes: LockStripes,
    config: RankingConfig,
}

impl RankingEngine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(RankingConfig::default())
    }

    /// Creates an engine from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RankingError::InvalidConfig`] if the config is rejected.
    pub fn with_config(config: RankingConfig) -> RankingResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RankingConfig) -> Self {
        debug!(
            table_shards = config.table_shards,
            lock_stripes = config.lock_stripes,
            "ranking engine created"
        );
        Self {
            table: PlayerScoreTable::new(config.table_shards),
            index: ScoreIndex::new(),
            stripes: LockStripes::new(config.lock_stripes),
            config,
        }
    }

    /// Returns the configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Sets the score of `player`, moving it to the matching bucket.
    ///
    /// Safe to call concurrently, including for the same player.
    pub fn update_score(&self, player: impl Into<PlayerId>, score: Score) {
        let player = player.into();
        let _stripe = self.stripes.lock(player.as_str());

        let previous = self.table.set(player.clone(), score);
        match previous {
            Some(previous) if previous == score => {}
            Some(previous) => self.index.remove_member(previous, player.as_str()),
            None => {}
        }
        trace!(player = %player, ?previous, score, "score updated");
        self.index.add_member(score, player);
    }

    /// Current score of `player`, or [`DEFAULT_SCORE`] if never scored.
    #[must_use]
    pub fn score_of(&self, player: &str) -> Score {
        self.table.get(player).unwrap_or(DEFAULT_SCORE)
    }

    /// Current score of `player`, `None` if never scored.
    #[must_use]
    pub fn try_score_of(&self, player: &str) -> Option<Score> {
        self.table.get(player)
    }

    /// Up to `n` players, highest score first, ties in id order.
    ///
    /// `n == 0` yields nothing; `n` beyond the player count yields everyone.
    #[must_use]
    pub fn top_n(&self, n: usize) -> Vec<PlayerId> {
        self.index.top_n(n)
    }

    /// Like [`RankingEngine::top_n`], with the score each player was ranked at.
    #[must_use]
    pub fn top_n_with_scores(&self, n: usize) -> Vec<RankedEntry> {
        self.index.top_n_with_scores(n)
    }

    /// Distinct players ever scored since the last [`RankingEngine::clear`].
    #[must_use]
    pub fn total_players(&self) -> usize {
        self.table.len()
    }

    /// Empties the board.
    ///
    /// Takes every stripe first, so no update is half applied across the
    /// reset. Readers racing with `clear` may see a partially emptied board.
    pub fn clear(&self) {
        let _stripes = self.stripes.lock_all();
        self.index.clear();
        self.table.clear();
        debug!("ranking engine cleared");
    }

    /// Total bucket memberships in the index.
    #[must_use]
    pub fn indexed_members(&self) -> usize {
        self.index.member_count()
    }

    /// Number of distinct scores on the board.
    #[must_use]
    pub fn distinct_scores(&self) -> usize {
        self.index.bucket_count()
    }

    /// Verifies both board invariants.
    ///
    /// Only meaningful while no writer is active. Every bucket must be
    /// non-empty, every member must map to its bucket's score in the table,
    /// and the index must hold exactly as many memberships as the table has
    /// players.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn check_consistency(&self) -> RankingResult<()> {
        let table: HashMap<PlayerId, Score> = self.table.snapshot().into_iter().collect();
        let mut memberships = 0usize;

        for (score, members) in self.index.snapshot() {
            if members.is_empty() {
                warn!(score, "empty bucket left in index");
                return Err(RankingError::OrphanBucket(score));
            }
            for player in members {
                memberships += 1;
                match table.get(&player) {
                    Some(&expected) if expected == score => {}
                    Some(&expected) => {
                        warn!(player = %player, score, expected, "player in wrong bucket");
                        return Err(RankingError::Inconsistent {
                            player: player.to_string(),
                            detail: format!("in bucket {score}, table says {expected}"),
                        });
                    }
                    None => {
                        warn!(player = %player, score, "bucket member missing from table");
                        return Err(RankingError::Inconsistent {
                            player: player.to_string(),
                            detail: format!("in bucket {score}, absent from table"),
                        });
                    }
                }
            }
        }

        if memberships != table.len() {
            let missing = table
                .keys()
                .find(|player| self.index.buckets_of(player.as_str()).is_empty())
                .map_or_else(String::new, ToString::to_string);
            warn!(memberships, players = table.len(), "membership count mismatch");
            return Err(RankingError::Inconsistent {
                player: missing,
                detail: format!(
                    "{memberships} bucket memberships for {} players",
                    table.len()
                ),
            });
        }
        Ok(())
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(players: &[PlayerId]) -> Vec<&str> {
        players.iter().map(PlayerId::as_str).collect()
    }

    #[test]
    fn test_example_scenario() {
        let board = RankingEngine::new();
        board.update_score("A", 10);
        board.update_score("B", 20);
        board.update_score("A", 25);

        assert_eq!(names(&board.top_n(2)), vec!["A", "B"]);
        assert_eq!(board.score_of("A"), 25);
        assert_eq!(board.total_players(), 2);
        board.check_consistency().unwrap();
    }

    #[test]
    fn test_tie_scenario() {
        let board = RankingEngine::new();
        board.update_score("B", 10);
        board.update_score("A", 10);
        assert_eq!(names(&board.top_n(2)), vec!["A", "B"]);
        assert_eq!(board.distinct_scores(), 1);
    }

    #[test]
    fn test_monotonic_replace() {
        let board = RankingEngine::new();
        board.update_score("p", 5);
        board.update_score("p", 9);
        assert_eq!(board.score_of("p"), 9);
        assert_eq!(board.index.buckets_of("p"), vec![9]);
        assert_eq!(board.distinct_scores(), 1);
    }

    #[test]
    fn test_same_score_twice_is_idempotent() {
        let once = RankingEngine::new();
        once.update_score("p", 7);

        let twice = RankingEngine::new();
        twice.update_score("p", 7);
        twice.update_score("p", 7);

        assert_eq!(once.index.snapshot(), twice.index.snapshot());
        assert_eq!(once.total_players(), twice.total_players());
        assert_eq!(twice.indexed_members(), 1);
    }

    #[test]
    fn test_unknown_player_defaults() {
        let board = RankingEngine::new();
        assert_eq!(board.score_of("ghost"), DEFAULT_SCORE);
        assert_eq!(board.try_score_of("ghost"), None);
        board.update_score("real", 0);
        assert_eq!(board.try_score_of("real"), Some(0));
    }

    #[test]
    fn test_negative_scores_rank_below_zero() {
        let board = RankingEngine::new();
        board.update_score("neg", -3);
        board.update_score("zero", 0);
        board.update_score("pos", 1);
        assert_eq!(names(&board.top_n(3)), vec!["pos", "zero", "neg"]);
    }

    #[test]
    fn test_top_n_bounds() {
        let board = RankingEngine::new();
        assert!(board.top_n(5).is_empty());
        board.update_score("a", 1);
        board.update_score("b", 2);
        assert!(board.top_n(0).is_empty());
        assert_eq!(board.top_n(100).len(), 2);
    }

    #[test]
    fn test_top_n_with_scores() {
        let board = RankingEngine::new();
        board.update_score("a", 1);
        board.update_score("b", 2);
        let entries = board.top_n_with_scores(2);
        assert_eq!(
            entries,
            vec![
                RankedEntry { player: "b".into(), score: 2 },
                RankedEntry { player: "a".into(), score: 1 },
            ]
        );
    }

    #[test]
    fn test_clear() {
        let board = RankingEngine::new();
        for i in 0..50 {
            board.update_score(format!("p{i}"), i);
        }
        board.clear();
        assert_eq!(board.total_players(), 0);
        assert!(board.top_n(10).is_empty());
        assert_eq!(board.score_of("p3"), DEFAULT_SCORE);
        board.check_consistency().unwrap();

        board.update_score("p3", 8);
        assert_eq!(names(&board.top_n(10)), vec!["p3"]);
    }

    #[test]
    fn test_with_config() {
        let board = RankingEngine::with_config(RankingConfig::single()).unwrap();
        assert_eq!(board.config(), &RankingConfig::single());
        board.update_score("x", 1);
        assert_eq!(board.total_players(), 1);

        let bad = RankingConfig {
            table_shards: 3,
            lock_stripes: 4,
        };
        assert!(RankingEngine::with_config(bad).is_err());
    }

    #[test]
    fn test_consistency_checker_detects_corruption() {
        let board = RankingEngine::new();
        board.update_score("a", 1);
        // Bypass the facade to put the player in a second bucket.
        board.index.add_member(5, "a".into());
        let err = board.check_consistency().unwrap_err();
        assert!(matches!(err, RankingError::Inconsistent { ref player, .. } if player == "a"));

        let board = RankingEngine::new();
        board.table.set("lost".into(), 3);
        assert!(matches!(
            board.check_consistency(),
            Err(RankingError::Inconsistent { .. })
        ));
    }
}

//! # Player Score Table
//!
//! Sharded `PlayerId -> Score` map. Each shard is a `parking_lot::RwLock`
//! around a `HashMap`; a key always lives in the shard picked by its keyed
//! hash, so operations on one key touch exactly one lock.
//!
//! ```text
//!   set("alice", 40) ──> slot_of("alice") = 5 ──> shards[5].write().insert(..)
//!   get("bob")       ──> slot_of("bob")   = 2 ──> shards[2].read().get(..)
//! ```

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::player::{slot_of, PlayerId, Score};

/// Concurrent player -> current score store.
///
/// Updates to one key are linearizable. No ordering is promised between
/// different keys.
pub struct PlayerScoreTable {
    shards: Box<[RwLock<HashMap<PlayerId, Score>>]>,
    mask: usize,
}

impl PlayerScoreTable {
    /// Creates a table with `shards` shards.
    ///
    /// # Panics
    ///
    /// Panics if `shards` is not a power of two.
    #[must_use]
    pub fn new(shards: usize) -> Self {
        assert!(
            shards.is_power_of_two(),
            "shard count must be a power of two, got {shards}"
        );
        let shards: Box<[_]> = (0..shards).map(|_| RwLock::new(HashMap::new())).collect();
        let mask = shards.len() - 1;
        Self { shards, mask }
    }

    #[inline]
    fn shard(&self, player: &str) -> &RwLock<HashMap<PlayerId, Score>> {
        &self.shards[slot_of(player, self.mask)]
    }

    /// Returns the committed score of `player`, if any.
    #[must_use]
    pub fn get(&self, player: &str) -> Option<Score> {
        self.shard(player).read().get(player).copied()
    }

    /// Replaces the score of `player` and returns the previous one.
    ///
    /// `None` means the player was new.
    pub fn set(&self, player: PlayerId, score: Score) -> Option<Score> {
        self.shard(player.as_str()).write().insert(player, score)
    }

    /// Number of distinct players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    /// Returns true if no player has a score.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.read().is_empty())
    }

    /// Number of shards.
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Removes every player, shard by shard.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.write().clear();
        }
    }

    /// Copies all entries. Each shard is copied under its own read lock.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(PlayerId, Score)> {
        let mut out = Vec::new();
        for shard in self.shards.iter() {
            let shard = shard.read();
            out.extend(shard.iter().map(|(player, score)| (player.clone(), *score)));
        }
        out
    }
}

impl Default for PlayerScoreTable {
    fn default() -> Self {
        Self::new(crate::RankingConfig::default().table_shards)
    }
}

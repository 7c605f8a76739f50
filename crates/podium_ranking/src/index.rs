//! # Score Index
//!
//! Ordered `Score -> {PlayerId}` buckets, walked from the highest score down.
//!
//! ## Locking
//!
//! ```text
//!   buckets: RwLock<BTreeMap<Score, Arc<Bucket>>>     (structure only)
//!                          │
//!            ┌─────────────┼─────────────┐
//!            ▼             ▼             ▼
//!      Bucket(40)     Bucket(25)     Bucket(10)
//!      Mutex{set}     Mutex{set}     Mutex{set}        (membership)
//! ```
//!
//! The map lock is held only to find, create or unlink a bucket. Member
//! changes lock exactly one bucket. A bucket whose last member leaves is
//! marked `retired` under its own lock and then unlinked; a retired bucket
//! never takes members again, so a writer that raced onto it unlinks it and
//! retries on a fresh one.
//!
//! Lock order is map, then bucket. No code path takes the map lock while
//! holding a bucket lock.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::player::{PlayerId, RankedEntry, Score};

#[derive(Default)]
struct BucketState {
    members: BTreeSet<PlayerId>,
    retired: bool,
}

#[derive(Default)]
struct Bucket {
    state: Mutex<BucketState>,
}

/// Concurrent ordered index of score buckets.
#[derive(Default)]
pub struct ScoreIndex {
    buckets: RwLock<BTreeMap<Score, Arc<Bucket>>>,
}

impl ScoreIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `player` to the bucket for `score`, creating it if needed.
    ///
    /// Adding a player already in that bucket is a no-op.
    pub fn add_member(&self, score: Score, player: PlayerId) {
        loop {
            let bucket = self.bucket_for_insert(score);
            let mut state = bucket.state.lock();
            if state.retired {
                drop(state);
                self.unlink(score, &bucket);
                continue;
            }
            state.members.insert(player);
            return;
        }
    }

    /// Removes `player` from the bucket for `score`.
    ///
    /// Unlinks the bucket when it becomes empty. No-op if the player is not
    /// in that bucket.
    pub fn remove_member(&self, score: Score, player: &str) {
        let Some(bucket) = self.buckets.read().get(&score).cloned() else {
            return;
        };

        let emptied = {
            let mut state = bucket.state.lock();
            if !state.members.remove(player) {
                return;
            }
            if state.members.is_empty() {
                state.retired = true;
                true
            } else {
                false
            }
        };

        if emptied {
            self.unlink(score, &bucket);
        }
    }

    /// Up to `n` players, highest score first, ties in id order.
    ///
    /// Weakly consistent: buckets are read one at a time. A player moved
    /// during the walk can be missed, but is never returned twice.
    #[must_use]
    pub fn top_n(&self, n: usize) -> Vec<PlayerId> {
        self.top_n_with_scores(n)
            .into_iter()
            .map(|entry| entry.player)
            .collect()
    }

    /// Like [`ScoreIndex::top_n`], paired with each bucket's score.
    #[must_use]
    pub fn top_n_with_scores(&self, n: usize) -> Vec<RankedEntry> {
        if n == 0 {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let buckets = self.buckets.read();

        for (&score, bucket) in buckets.iter().rev() {
            let state = bucket.state.lock();
            if state.retired {
                continue;
            }
            for player in &state.members {
                if !seen.insert(player.clone()) {
                    continue;
                }
                out.push(RankedEntry {
                    player: player.clone(),
                    score,
                });
                if out.len() == n {
                    return out;
                }
            }
        }
        out
    }

    /// Total players across all buckets.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.buckets
            .read()
            .values()
            .map(|bucket| bucket.state.lock().members.len())
            .sum()
    }

    /// Number of linked buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.read().len()
    }

    /// Returns true if no bucket is linked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.read().is_empty()
    }

    /// Every score whose bucket currently contains `player`. Linear scan.
    #[must_use]
    pub fn buckets_of(&self, player: &str) -> Vec<Score> {
        self.buckets
            .read()
            .iter()
            .rev()
            .filter(|(_, bucket)| bucket.state.lock().members.contains(player))
            .map(|(&score, _)| score)
            .collect()
    }

    /// Copies every linked bucket, highest score first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(Score, Vec<PlayerId>)> {
        self.buckets
            .read()
            .iter()
            .rev()
            .map(|(&score, bucket)| {
                let state = bucket.state.lock();
                (score, state.members.iter().cloned().collect())
            })
            .collect()
    }

    /// Drops every bucket.
    ///
    /// Detached buckets are retired so a writer still holding one retries
    /// against the new, empty map.
    pub fn clear(&self) {
        let detached = std::mem::take(&mut *self.buckets.write());
        for bucket in detached.values() {
            let mut state = bucket.state.lock();
            state.retired = true;
            state.members.clear();
        }
    }

    fn bucket_for_insert(&self, score: Score) -> Arc<Bucket> {
        if let Some(bucket) = self.buckets.read().get(&score) {
            return Arc::clone(bucket);
        }
        let mut buckets = self.buckets.write();
        Arc::clone(buckets.entry(score).or_default())
    }

    /// Unlinks `bucket` if it is still the one mapped at `score`.
    fn unlink(&self, score: Score, bucket: &Arc<Bucket>) {
        let mut buckets = self.buckets.write();
        if buckets
            .get(&score)
            .is_some_and(|current| Arc::ptr_eq(current, bucket))
        {
            buckets.remove(&score);
        }
    }
}

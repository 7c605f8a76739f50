//! # Player Identity and Scores
//!
//! `PlayerId` is an opaque, cheaply clonable string. The same id is stored
//! in the score table and in one bucket of the score index, so clones share
//! a single allocation.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use siphasher::sip::SipHasher13;

/// Ranking value of a player. Negative scores are valid.
pub type Score = i64;

/// Fixed SipHash keys for shard and stripe selection.
///
/// Selection only has to spread keys evenly, it is never exposed.
const SLOT_KEY_0: u64 = 0x7064_6d5f_7374_7270;
const SLOT_KEY_1: u64 = 0x9e37_79b9_7f4a_7c15;

/// Unique identifier of a ranked participant.
///
/// Ordered lexicographically by bytes. This is the tie-break order inside a
/// score bucket.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(Arc<str>);

impl PlayerId {
    /// Creates a player id from any string.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PlayerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&PlayerId> for PlayerId {
    fn from(id: &PlayerId) -> Self {
        id.clone()
    }
}

impl PartialEq<str> for PlayerId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for PlayerId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// One row of a ranked read: the player and the score of the bucket it was
/// read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedEntry {
    /// The ranked player.
    pub player: PlayerId,
    /// Score of the bucket the player was found in.
    pub score: Score,
}

/// Maps a player key onto one of `mask + 1` slots.
///
/// `mask` must be a power of two minus one.
#[inline]
pub(crate) fn slot_of(key: &str, mask: usize) -> usize {
    let mut hasher = SipHasher13::new_with_keys(SLOT_KEY_0, SLOT_KEY_1);
    hasher.write(key.as_bytes());
    // Truncation is fine: only the low bits survive the mask.
    #[allow(clippy::cast_possible_truncation)]
    let hash = hasher.finish() as usize;
    hash & mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_ordering_is_lexicographic() {
        let ids: BTreeSet<PlayerId> = ["User_10", "User_2", "A", "B"]
            .into_iter()
            .map(PlayerId::from)
            .collect();
        let ordered: Vec<&str> = ids.iter().map(PlayerId::as_str).collect();
        assert_eq!(ordered, vec!["A", "B", "User_10", "User_2"]);
    }

    #[test]
    fn test_borrow_lookup_by_str() {
        let mut set = BTreeSet::new();
        set.insert(PlayerId::from("alice"));
        assert!(set.contains("alice"));
        assert!(!set.contains("bob"));
    }

    #[test]
    fn test_slot_is_stable_and_masked() {
        let a = slot_of("player-42", 63);
        let b = slot_of("player-42", 63);
        assert_eq!(a, b);
        assert!(a < 64);
        assert_eq!(slot_of("anything", 0), 0);
    }

    #[test]
    fn test_slots_spread() {
        let used: BTreeSet<usize> = (0..1_000).map(|i| slot_of(&format!("p{i}"), 15)).collect();
        assert_eq!(used.len(), 16, "1000 keys should touch all 16 slots");
    }

    #[test]
    fn test_display_and_eq_str() {
        let id = PlayerId::new(String::from("Zed"));
        assert_eq!(id.to_string(), "Zed");
        assert_eq!(id, "Zed");
        assert_eq!(format!("{id:?}"), "\"Zed\"");
        assert_eq!(format!("[{id:<5}]"), "[Zed  ]");
    }
}

//! # Lock Striping
//!
//! A fixed array of mutexes indexed by the keyed hash of a player id.
//! Two updates for the same player always pick the same stripe and run one
//! after the other; players on different stripes never contend.

use parking_lot::{Mutex, MutexGuard};

use crate::player::slot_of;

/// Per-key serialization through a fixed set of mutexes.
pub struct LockStripes {
    stripes: Box<[Mutex<()>]>,
    mask: usize,
}

impl LockStripes {
    /// Creates `count` stripes.
    ///
    /// # Panics
    ///
    /// Panics if `count` is not a power of two.
    #[must_use]
    pub fn new(count: usize) -> Self {
        assert!(
            count.is_power_of_two(),
            "stripe count must be a power of two, got {count}"
        );
        let stripes: Box<[_]> = (0..count).map(|_| Mutex::new(())).collect();
        let mask = stripes.len() - 1;
        Self { stripes, mask }
    }

    /// Number of stripes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stripes.len()
    }

    /// Always false; a stripe set has at least one stripe.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stripes.is_empty()
    }

    /// Stripe index used for `key`.
    #[inline]
    #[must_use]
    pub fn index_of(&self, key: &str) -> usize {
        slot_of(key, self.mask)
    }

    /// Locks the stripe owning `key`.
    pub fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.stripes[self.index_of(key)].lock()
    }

    /// Locks every stripe in index order.
    ///
    /// Holders of a single stripe never wait on a second one, so ascending
    /// acquisition cannot deadlock against them.
    pub fn lock_all(&self) -> Vec<MutexGuard<'_, ()>> {
        self.stripes.iter().map(|stripe| stripe.lock()).collect()
    }
}

//! Inventory - Pending flowers awaiting a bouquet.
//!
//! Species × size is a small fixed domain (26 × 2), so counts live in a
//! dense array: every key always exists and absent flowers read as 0.
//! Per-size totals are cached for the O(1) size feasibility check.

use crate::command::{FlowerKey, Size, Species};
use crate::error::InternalError;
use crate::matching::Allocation;

/// Multiset of flowers keyed by (species, size).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Inventory {
    /// Count per key, indexed `[size][species]`
    counts: [[u64; Species::COUNT]; Size::COUNT],
    /// Cached sum of `counts[size]`
    totals: [u64; Size::COUNT],
}

impl Inventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one arriving flower.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn add(&mut self, key: FlowerKey) {
        self.counts[key.size.index()][key.species.index()] += 1;
        self.totals[key.size.index()] += 1;
    }

    /// Count of one key (0 if none arrived yet)
    #[inline]
    pub fn count(&self, key: FlowerKey) -> u64 {
        self.count_of(key.species, key.size)
    }

    /// Count of one species at one size
    #[inline]
    pub fn count_of(&self, species: Species, size: Size) -> u64 {
        self.counts[size.index()][species.index()]
    }

    /// Total flowers of a size across all species
    #[inline]
    pub fn count_of_size(&self, size: Size) -> u64 {
        self.totals[size.index()]
    }

    /// Total flowers held
    #[inline]
    pub fn total(&self) -> u64 {
        self.totals.iter().sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Species with a non-zero count at `size`, species ascending.
    ///
    /// This is the order the matcher scans when filling spare slots.
    pub fn stocked(&self, size: Size) -> impl Iterator<Item = (Species, u64)> + '_ {
        self.counts[size.index()]
            .iter()
            .enumerate()
            .filter_map(|(index, &count)| {
                if count == 0 {
                    return None;
                }
                Species::from_index(index).map(|species| (species, count))
            })
    }

    /// Remove the flowers of an allocation.
    ///
    /// Every key is checked before anything is subtracted, so a failed
    /// call leaves the inventory untouched. A shortfall means the matcher
    /// handed out flowers it never confirmed, which is a bug.
    pub fn consume(&mut self, allocation: &Allocation) -> Result<(), InternalError> {
        for (key, qty) in allocation.iter() {
            let available = self.count(key);
            if available < qty as u64 {
                return Err(InternalError::InventoryUnderflow {
                    key,
                    available,
                    requested: qty,
                });
            }
        }

        for (key, qty) in allocation.iter() {
            self.counts[key.size.index()][key.species.index()] -= qty as u64;
            self.totals[key.size.index()] -= qty as u64;
        }

        Ok(())
    }
}

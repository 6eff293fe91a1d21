//! Matching - Greedy first-match bouquet allocation.
//!
//! Implements the check/fill algorithm:
//! 1. SIZE: enough same-size flowers for every slot
//! 2. SPECIES: every required minimum is on hand
//! 3. FILL: minimums first, then spare slots from per-species surplus
//!
//! The first recipe in catalogue order that passes 1 and 2 wins. Nothing
//! looks ahead for a better allocation.

use std::fmt;

use arrayvec::ArrayVec;

use crate::command::{FlowerKey, Size, Species};
use crate::inventory::Inventory;
use crate::recipe::Recipe;

/// Flowers chosen to build one bouquet, all of a single size.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
    size: Size,
    /// Quantity per species, species ascending
    entries: ArrayVec<(Species, u32), { Species::COUNT }>,
}

impl Allocation {
    /// Create an empty allocation for flowers of `size`
    pub fn new(size: Size) -> Self {
        Self {
            size,
            entries: ArrayVec::new(),
        }
    }

    /// Add `qty` flowers of a species, merging with any existing entry
    pub(crate) fn add(&mut self, species: Species, qty: u32) {
        match self.entries.binary_search_by_key(&species, |&(s, _)| s) {
            Ok(pos) => self.entries[pos].1 += qty,
            // One entry per species, so the capacity of 26 always suffices
            Err(pos) => self.entries.insert(pos, (species, qty)),
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Allocated keys and quantities, species ascending
    pub fn iter(&self) -> impl Iterator<Item = (FlowerKey, u32)> + '_ {
        let size = self.size;
        self.entries
            .iter()
            .map(move |&(species, qty)| (FlowerKey::new(species, size), qty))
    }

    /// Quantity allocated for one species (0 if none)
    pub fn quantity_of(&self, species: Species) -> u32 {
        self.entries
            .binary_search_by_key(&species, |&(s, _)| s)
            .map_or(0, |pos| self.entries[pos].1)
    }

    /// Total flowers in the allocation
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|&(_, qty)| qty as u64).sum()
    }

    /// Number of distinct species used
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Renders as `<qty><species>` pairs, e.g. `2a1b`.
impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(species, qty) in &self.entries {
            write!(f, "{}{}", qty, species)?;
        }
        Ok(())
    }
}

/// A buildable recipe and the flowers to build it with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    /// Position of the recipe in the catalogue
    pub index: usize,
    /// Flowers to take from the inventory
    pub allocation: Allocation,
}

/// Find the first buildable recipe in catalogue order.
///
/// # Returns
/// `None` when no recipe can be built right now. Neither argument is
/// modified either way.
pub fn find_match(catalogue: &[Recipe], inventory: &Inventory) -> Option<Match> {
    catalogue
        .iter()
        .position(|recipe| is_size_feasible(recipe, inventory) && is_species_feasible(recipe, inventory))
        .map(|index| Match {
            index,
            allocation: allocate(&catalogue[index], inventory),
        })
}

/// Enough flowers of the recipe's size exist to fill every slot.
#[inline]
pub fn is_size_feasible(recipe: &Recipe, inventory: &Inventory) -> bool {
    inventory.count_of_size(recipe.size()) >= recipe.total_slots() as u64
}

/// Every required species is present at its minimum quantity.
#[inline]
pub fn is_species_feasible(recipe: &Recipe, inventory: &Inventory) -> bool {
    recipe
        .required()
        .iter()
        .all(|&(species, qty)| inventory.count_of(species, recipe.size()) >= qty as u64)
}

/// Build the allocation for a recipe that passed both feasibility checks.
///
/// Starts from the required minimums, then fills the spare slots from
/// each stocked species' surplus over its own minimum, scanning species
/// `a` to `z`. Size feasibility guarantees the surplus covers the spare
/// slots: `count_of_size - required_sum >= total_slots - required_sum`.
pub fn allocate(recipe: &Recipe, inventory: &Inventory) -> Allocation {
    let size = recipe.size();
    let mut allocation = Allocation::new(size);

    for &(species, qty) in recipe.required() {
        allocation.add(species, qty);
    }

    let mut remaining = recipe.filler_slots();
    if remaining == 0 {
        return allocation;
    }

    for (species, count) in inventory.stocked(size) {
        let surplus = count.saturating_sub(recipe.required_of(species) as u64);
        if surplus == 0 {
            continue;
        }

        let take = surplus.min(remaining as u64) as u32;
        allocation.add(species, take);
        remaining -= take;

        if remaining == 0 {
            break;
        }
    }

    debug_assert_eq!(remaining, 0, "spare slots left unfilled for {}", recipe.code());
    allocation
}

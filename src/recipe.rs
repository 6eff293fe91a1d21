//! Recipe - An immutable bouquet specification.
//!
//! A recipe names a size, a minimum quantity for some species, and the
//! exact number of flowers the finished bouquet holds. Slots beyond the
//! required minimums are filled with any flower of the same size.

use std::fmt;

use arrayvec::ArrayVec;

use crate::command::{Size, Species};
use crate::error::DecodeError;

/// Required species and their minimum quantities, species ascending.
///
/// At most one entry per species, so it never outgrows the stack.
pub type Requirements = ArrayVec<(Species, u32), { Species::COUNT }>;

/// A validated bouquet recipe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipe {
    /// Opaque identifier, also the emitted line
    code: String,
    /// Recipe family (`A`..=`Z`), informational only
    group: char,
    /// Size shared by every flower in the bouquet
    size: Size,
    /// Minimum quantity per species
    required: Requirements,
    /// Cached sum of `required` quantities
    required_sum: u32,
    /// Exact number of flowers in the finished bouquet
    total_slots: u32,
}

impl Recipe {
    /// Build a recipe, checking every structural invariant.
    ///
    /// Checks run in a fixed order: group letter, repeated species,
    /// species order, non-positive quantities, then slot capacity.
    pub fn new(
        code: impl Into<String>,
        group: char,
        size: Size,
        required: Requirements,
        total_slots: u32,
    ) -> Result<Self, DecodeError> {
        let code = code.into();

        if !group.is_ascii_uppercase() || required.is_empty() {
            return Err(DecodeError::MalformedRecipe(code));
        }

        let mut seen = 0u32;
        for &(species, _) in &required {
            let bit = 1u32 << species.index();
            if seen & bit != 0 {
                return Err(DecodeError::RepeatedSpecies(code));
            }
            seen |= bit;
        }

        if required.windows(2).any(|pair| pair[0].0 > pair[1].0) {
            return Err(DecodeError::UnsortedSpecies(code));
        }

        if total_slots == 0 || required.iter().any(|&(_, qty)| qty == 0) {
            return Err(DecodeError::NonPositiveQuantity(code));
        }

        let sum: u64 = required.iter().map(|&(_, qty)| qty as u64).sum();
        if sum > total_slots as u64 {
            return Err(DecodeError::SlotsBelowRequired {
                code,
                total: total_slots,
                required: sum,
            });
        }

        Ok(Self {
            code,
            group,
            size,
            required,
            // sum <= total_slots, so it fits
            required_sum: sum as u32,
            total_slots,
        })
    }

    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Consume the recipe, keeping only its code
    #[inline]
    pub fn into_code(self) -> String {
        self.code
    }

    #[inline]
    pub fn group(&self) -> char {
        self.group
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Required species with their minimum quantities, species ascending
    #[inline]
    pub fn required(&self) -> &[(Species, u32)] {
        &self.required
    }

    /// Minimum quantity of one species (0 when not required)
    #[inline]
    pub fn required_of(&self, species: Species) -> u32 {
        self.required
            .iter()
            .find(|&&(s, _)| s == species)
            .map_or(0, |&(_, qty)| qty)
    }

    /// Sum of all required quantities
    #[inline]
    pub fn required_sum(&self) -> u32 {
        self.required_sum
    }

    #[inline]
    pub fn total_slots(&self) -> u32 {
        self.total_slots
    }

    /// Slots left for any same-size flower once the minimums are met
    #[inline]
    pub fn filler_slots(&self) -> u32 {
        self.total_slots - self.required_sum
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

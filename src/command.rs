//! Command and Event types for the bouquet engine.
//!
//! Commands are decoded input lines.
//! Events are outputs to the line sink.

use std::fmt;

use crate::matching::Allocation;
use crate::recipe::Recipe;

/// Flower (and bouquet) size
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Size {
    /// Large flowers, encoded as `L`
    Large = 0,
    /// Small flowers, encoded as `S`
    Small = 1,
}

impl Size {
    /// Number of distinct sizes
    pub const COUNT: usize = 2;

    /// All sizes in storage order
    pub const ALL: [Size; Size::COUNT] = [Size::Large, Size::Small];

    /// Parse the single-letter size code
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'L' => Some(Size::Large),
            'S' => Some(Size::Small),
            _ => None,
        }
    }

    /// The single-letter size code
    #[inline]
    pub const fn as_char(self) -> char {
        match self {
            Size::Large => 'L',
            Size::Small => 'S',
        }
    }

    /// Storage index (0 or 1)
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Flower species, a lowercase letter `a`..=`z`.
///
/// Stored as its offset from `a` so it doubles as an array index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Species(u8);

impl Species {
    /// Number of distinct species
    pub const COUNT: usize = 26;

    /// Parse a species letter
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        if c.is_ascii_lowercase() {
            Some(Species(c as u8 - b'a'))
        } else {
            None
        }
    }

    /// Species at a storage index, `None` past `z`
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Species(index as u8))
        } else {
            None
        }
    }

    /// The species letter
    #[inline]
    pub const fn as_char(self) -> char {
        (b'a' + self.0) as char
    }

    /// Storage index (0..26)
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// All species, `a` through `z`
    pub fn all() -> impl Iterator<Item = Species> {
        (0..Self::COUNT as u8).map(Species)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Inventory key: one species at one size (e.g. `aL`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowerKey {
    pub species: Species,
    pub size: Size,
}

impl FlowerKey {
    #[inline]
    pub const fn new(species: Species, size: Size) -> Self {
        Self { species, size }
    }
}

impl fmt::Display for FlowerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.species, self.size)
    }
}

// ============================================================================
// Input Commands
// ============================================================================

/// A decoded input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// A recipe for the catalogue
    Recipe(Recipe),
    /// A single arriving flower
    Flower(FlowerKey),
    /// The blank line between recipes and flowers
    Separator,
}

// ============================================================================
// Output Events
// ============================================================================

/// A bouquet was assembled from the pending flowers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BouquetBuilt {
    /// 1-based position of the triggering line in the stream
    pub line: u64,
    /// Code of the recipe that was built (the emitted line)
    pub code: String,
    /// Size of every flower used
    pub size: Size,
    /// Flowers taken out of the inventory
    pub allocation: Allocation,
}

impl fmt::Display for BouquetBuilt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

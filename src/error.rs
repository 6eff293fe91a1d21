//! Error taxonomy for the engine and its decoders.

use thiserror::Error;

use crate::command::FlowerKey;

/// A single input line could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("recipe '{0}' does not have a valid recipe format")]
    MalformedRecipe(String),

    #[error("recipe '{0}' repeats a flower species")]
    RepeatedSpecies(String),

    #[error("recipe '{0}' must list flower species in alphabetical order")]
    UnsortedSpecies(String),

    #[error("recipe '{0}' has a quantity that is not greater than 0")]
    NonPositiveQuantity(String),

    #[error("recipe '{code}' has {total} slots but requires {required} flowers")]
    SlotsBelowRequired {
        code: String,
        total: u32,
        required: u64,
    },

    #[error("flower '{0}' must be exactly two characters")]
    FlowerLength(String),

    #[error("flower '{0}' must have a species from 'a' to 'z'")]
    FlowerSpecies(String),

    #[error("flower '{0}' size must be L or S")]
    FlowerSize(String),
}

/// The overall shape of the input is wrong.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
    #[error("blank line received, but a recipe was expected")]
    SeparatorBeforeRecipes,

    #[error("blank line received, but a flower was expected")]
    SeparatorDuringFlowers,

    #[error("flower received before the recipe separator")]
    FlowerBeforeSeparator,

    #[error("recipe received after the recipe separator")]
    RecipeAfterSeparator,
}

/// The engine itself reached an inconsistent state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalError {
    #[error("inventory underflow on {key}: {requested} requested, {available} available")]
    InventoryUnderflow {
        key: FlowerKey,
        available: u64,
        requested: u32,
    },

    #[error("engine has halted after an earlier fault")]
    Halted,
}

/// Any fault that aborts stream processing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("input decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("unexpected input: {0}")]
    Sequence(#[from] SequenceError),

    #[error("internal consistency fault: {0}")]
    Internal(#[from] InternalError),
}

impl EngineError {
    /// True for faults that indicate a bug rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(self, EngineError::Internal(_))
    }
}

//! Codec - Decoders for recipe and flower lines.
//!
//! Recipe grammar (the whole line):
//!
//! ```text
//! <group A-Z> <size L|S> ( <qty digits> <species a-z> )+ <total digits>
//! ```
//!
//! e.g. `AL2a3b4z45`. Flower lines are exactly `<species a-z><size L|S>`.

use std::iter::Peekable;
use std::str::Chars;

use crate::command::{FlowerKey, Size, Species};
use crate::error::DecodeError;
use crate::recipe::{Recipe, Requirements};

/// Strip a trailing line terminator (`\n`, `\r\n`).
#[inline]
pub fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// True for the separator between recipes and flowers
#[inline]
pub fn is_blank(line: &str) -> bool {
    strip_line_ending(line).is_empty()
}

/// Decode a recipe line into a validated [`Recipe`].
pub fn decode_recipe(line: &str) -> Result<Recipe, DecodeError> {
    let code = strip_line_ending(line);
    let malformed = || DecodeError::MalformedRecipe(code.to_string());

    let mut chars = code.chars().peekable();

    let group = chars
        .next()
        .filter(char::is_ascii_uppercase)
        .ok_or_else(malformed)?;
    let size = chars.next().and_then(Size::from_char).ok_or_else(malformed)?;

    let mut pairs: Vec<(Species, u32)> = Vec::new();
    let total = loop {
        let qty = read_number(&mut chars).ok_or_else(malformed)?;
        match chars.next() {
            None => break qty,
            Some(c) => {
                let species = Species::from_char(c).ok_or_else(malformed)?;
                pairs.push((species, qty));
            }
        }
    };

    if pairs.is_empty() {
        return Err(malformed());
    }

    // More than 26 pairs can only mean a species repeats
    let mut required = Requirements::new();
    for pair in pairs {
        required
            .try_push(pair)
            .map_err(|_| DecodeError::RepeatedSpecies(code.to_string()))?;
    }

    Recipe::new(code, group, size, required, total)
}

/// Read one or more ASCII digits as a `u32`; `None` on no digits or overflow.
fn read_number(chars: &mut Peekable<Chars<'_>>) -> Option<u32> {
    let mut value: Option<u32> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        value = Some(value.unwrap_or(0).checked_mul(10)?.checked_add(digit)?);
    }
    value
}

/// Decode a two-character flower line, e.g. `aL`.
pub fn decode_flower(line: &str) -> Result<FlowerKey, DecodeError> {
    let code = strip_line_ending(line);

    let mut chars = code.chars();
    let (species, size) = match (chars.next(), chars.next(), chars.next()) {
        (Some(species), Some(size), None) => (species, size),
        _ => return Err(DecodeError::FlowerLength(code.to_string())),
    };

    let species =
        Species::from_char(species).ok_or_else(|| DecodeError::FlowerSpecies(code.to_string()))?;
    let size = Size::from_char(size).ok_or_else(|| DecodeError::FlowerSize(code.to_string()))?;

    Ok(FlowerKey::new(species, size))
}

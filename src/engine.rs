//! Engine - The two-phase stream state machine.
//!
//! Owns the recipe catalogue and the flower inventory exclusively. Each
//! line is fully processed, including any match, before the next one.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use tracing::{debug, error, info, warn};

use crate::codec;
use crate::command::{BouquetBuilt, Command, FlowerKey};
use crate::error::{EngineError, InternalError, SequenceError};
use crate::inventory::Inventory;
use crate::matching;
use crate::recipe::Recipe;

/// Where the engine is in the input stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Reading recipes until the blank separator (initial)
    CollectingRecipes,
    /// Reading flowers until end of input
    CollectingFlowers,
    /// A fault occurred; every further line is rejected
    Halted,
}

/// Running counters for a stream
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Lines (commands) processed, including the faulting one
    pub lines: u64,
    /// Recipes added to the catalogue
    pub recipes: u64,
    /// Flowers added to the inventory
    pub flowers: u64,
    /// Bouquets emitted
    pub bouquets: u64,
}

/// Input for the pipelined runtime
#[cfg(feature = "runtime")]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feed {
    /// One raw input line
    Line(String),
    /// End of input
    End,
}

/// The stream processor.
pub struct Engine {
    phase: Phase,
    /// Unbuilt recipes in input order (the matcher's scan order)
    catalogue: Vec<Recipe>,
    inventory: Inventory,
    stats: EngineStats,
}

impl Engine {
    /// Create an engine waiting for recipes.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an engine with room for `recipes` catalogue entries.
    pub fn with_capacity(recipes: usize) -> Self {
        Self {
            phase: Phase::CollectingRecipes,
            catalogue: Vec::with_capacity(recipes),
            inventory: Inventory::new(),
            stats: EngineStats::default(),
        }
    }

    /// Decode and process one raw input line.
    ///
    /// The decoder is picked by phase: recipe lines before the separator,
    /// flower lines after it.
    ///
    /// # Returns
    /// The bouquet built on this line, if any.
    pub fn process_line(&mut self, line: &str) -> Result<Option<BouquetBuilt>, EngineError> {
        match self.decode(line) {
            Ok(cmd) => self.process_command(cmd),
            Err(err) => {
                self.stats.lines += 1;
                Err(self.halt(err))
            }
        }
    }

    fn decode(&self, line: &str) -> Result<Command, EngineError> {
        if codec::is_blank(line) {
            return Ok(Command::Separator);
        }

        match self.phase {
            Phase::CollectingRecipes => Ok(Command::Recipe(codec::decode_recipe(line)?)),
            Phase::CollectingFlowers => Ok(Command::Flower(codec::decode_flower(line)?)),
            Phase::Halted => Err(InternalError::Halted.into()),
        }
    }

    /// Process one decoded command.
    ///
    /// Any error moves the engine to [`Phase::Halted`]; the stream must
    /// not be continued after a fault.
    pub fn process_command(&mut self, cmd: Command) -> Result<Option<BouquetBuilt>, EngineError> {
        self.stats.lines += 1;
        self.apply(cmd).map_err(|err| self.halt(err))
    }

    fn apply(&mut self, cmd: Command) -> Result<Option<BouquetBuilt>, EngineError> {
        match (self.phase, cmd) {
            (Phase::Halted, _) => Err(InternalError::Halted.into()),

            (Phase::CollectingRecipes, Command::Recipe(recipe)) => {
                debug!(code = recipe.code(), "recipe added");
                self.catalogue.push(recipe);
                self.stats.recipes += 1;
                Ok(None)
            }
            (Phase::CollectingRecipes, Command::Separator) => {
                if self.catalogue.is_empty() {
                    return Err(SequenceError::SeparatorBeforeRecipes.into());
                }
                info!(recipes = self.catalogue.len(), "catalogue complete, collecting flowers");
                self.phase = Phase::CollectingFlowers;
                Ok(None)
            }
            (Phase::CollectingRecipes, Command::Flower(_)) => {
                Err(SequenceError::FlowerBeforeSeparator.into())
            }

            (Phase::CollectingFlowers, Command::Flower(key)) => self.receive_flower(key),
            (Phase::CollectingFlowers, Command::Separator) => {
                Err(SequenceError::SeparatorDuringFlowers.into())
            }
            (Phase::CollectingFlowers, Command::Recipe(_)) => {
                Err(SequenceError::RecipeAfterSeparator.into())
            }
        }
    }

    /// Add a flower, then build the first buildable recipe if there is one.
    fn receive_flower(&mut self, key: FlowerKey) -> Result<Option<BouquetBuilt>, EngineError> {
        self.inventory.add(key);
        self.stats.flowers += 1;
        debug!(flower = %key, "flower received");

        let Some(found) = matching::find_match(&self.catalogue, &self.inventory) else {
            return Ok(None);
        };

        self.inventory.consume(&found.allocation)?;

        // Identical codes describe identical recipes, so every copy goes
        let recipe = self.catalogue.remove(found.index);
        self.catalogue.retain(|other| other.code() != recipe.code());
        self.stats.bouquets += 1;

        debug!(
            code = recipe.code(),
            flowers = %found.allocation,
            remaining = self.catalogue.len(),
            "bouquet built"
        );

        Ok(Some(BouquetBuilt {
            line: self.stats.lines,
            size: recipe.size(),
            code: recipe.into_code(),
            allocation: found.allocation,
        }))
    }

    fn halt(&mut self, err: EngineError) -> EngineError {
        if self.phase != Phase::Halted {
            // Bad input warns; only internal faults are errors
            if err.is_internal() {
                error!(line = self.stats.lines, error = %err, "stream aborted");
            } else {
                warn!(line = self.stats.lines, error = %err, "stream aborted");
            }
            self.phase = Phase::Halted;
        }
        err
    }

    /// Run the engine over a ring buffer of raw lines.
    ///
    /// # Arguments
    /// * `input` - Consumer end of the line ring buffer
    /// * `output` - Producer end of the emission ring buffer
    /// * `pin_to_core` - Whether to pin to the last available CPU core
    ///
    /// # Note
    /// Returns at [`Feed::End`] or on the first fault. Emissions are never
    /// dropped: a full output buffer is waited on.
    #[cfg(feature = "runtime")]
    pub fn run(
        &mut self,
        input: &mut rtrb::Consumer<Feed>,
        output: &mut rtrb::Producer<BouquetBuilt>,
        pin_to_core: bool,
    ) -> Result<(), EngineError> {
        if pin_to_core {
            self.pin_to_core();
        }

        loop {
            match input.pop() {
                Ok(Feed::Line(line)) => {
                    if let Some(mut built) = self.process_line(&line)? {
                        while let Err(rtrb::PushError::Full(back)) = output.push(built) {
                            built = back;
                            std::hint::spin_loop();
                        }
                    }
                }
                Ok(Feed::End) => return Ok(()),
                Err(_) => std::hint::spin_loop(),
            }
        }
    }

    /// Pin the current thread to the last available CPU core.
    pub fn pin_to_core(&self) {
        if let Some(core_ids) = core_affinity::get_core_ids() {
            if let Some(last_core) = core_ids.last() {
                core_affinity::set_for_current(*last_core);
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Unbuilt recipes in scan order
    #[inline]
    pub fn catalogue(&self) -> &[Recipe] {
        &self.catalogue
    }

    #[inline]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    #[inline]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Compute a hash of the current state (for determinism testing)
    pub fn state_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();

        self.phase.hash(&mut hasher);
        for recipe in &self.catalogue {
            recipe.code().hash(&mut hasher);
        }
        self.inventory.hash(&mut hasher);

        hasher.finish()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

//! # Bouquet-Stream
//!
//! A deterministic, streaming bouquet assembly engine.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: One engine owns the catalogue and inventory exclusively (no locks)
//! - **Fixed Key Space**: Inventory counts live in a dense 26 × 2 array
//! - **Greedy First-Match**: The first buildable recipe in input order wins
//! - **Fail-Stop**: Any fault halts the engine for the rest of the stream
//!
//! ## Architecture
//!
//! ```text
//! [Line Source] --> [Codec] --> [Engine] --(flower)--> [Inventory] --> [Matcher]
//!                                  |                                      |
//!                                  +---------- [Emitted Recipe Code] <----+
//! ```

pub mod codec;
pub mod command;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod matching;
pub mod recipe;
pub mod report;

// Re-exports for convenience
pub use command::{BouquetBuilt, Command, FlowerKey, Size, Species};
pub use engine::{Engine, EngineStats, Phase};
#[cfg(feature = "runtime")]
pub use engine::Feed;
pub use error::{DecodeError, EngineError, InternalError, SequenceError};
pub use inventory::Inventory;
pub use matching::{Allocation, Match};
pub use recipe::{Recipe, Requirements};
pub use report::ReportWriter;

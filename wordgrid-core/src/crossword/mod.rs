//! Procedural crossword generation and play state.
//!
//! - `CrosswordGenerator` places words on a grid so they interlock, over
//!   several random trials, and keeps the best board
//! - `CrosswordBoard` holds the cells, the placed words and the player's
//!   progress (entries, hints, concessions)
//! - `GeneratorConfig` carries the engine's tunable policy

/// Grid, cells, placed words and gameplay mutations.
pub mod board;

/// Engine policy with validated defaults.
pub mod config;

/// Trial-based randomized placement and board selection.
pub mod generator;

pub use board::{Bounds, Cell, CellRef, CrosswordBoard, HintState, Orientation, PlacedWord, Position};
pub use config::GeneratorConfig;
pub use generator::CrosswordGenerator;

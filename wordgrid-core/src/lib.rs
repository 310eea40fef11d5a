//! Word-game core of a personal dictionary app.
//!
//! This crate provides:
//! - Grapheme cluster segmentation for letter-level word games
//! - A mixed-script word tokenizer with compound-word merging
//! - Randomized selection primitives
//! - A procedural crossword generator and its board model
//! - The word store interface, an in-memory store and a definition cache

/// Extended grapheme cluster segmentation.
pub mod grapheme;

/// Text to dictionary-lookup candidates.
pub mod tokenizer;

/// Random pickers and draw-without-replacement primitives.
pub mod pick;

/// Crossword generation and play state.
pub mod crossword;

/// Word store trait and implementations.
pub mod store;

/// Crate error type.
pub mod errors;

/// File and folder helpers for dictionary loading.
pub mod io;

pub use errors::{Error, Result};

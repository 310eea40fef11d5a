//! Error type shared by every wordgrid-core module.
//!
//! Placement exhaustion is not represented here: a crossword trial that runs
//! out of anchors simply ends with fewer words. Errors are reserved for I/O,
//! store lookups, cancelled work and invalid board edits.

use std::io;

/// Errors produced by wordgrid-core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] postcard::Error),

	#[error("Unknown dictionary '{0}'")]
	UnknownDictionary(String),

	#[error("Invalid dictionary entry on line {line}: {reason}")]
	InvalidEntry { line: usize, reason: String },

	#[error("Word store lookup failed: {0}")]
	Lookup(String),

	#[error("Operation cancelled")]
	Cancelled,

	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("No cell at ({x}, {y})")]
	NoSuchCell { x: i32, y: i32 },

	#[error("Cell at ({x}, {y}) is locked")]
	LockedCell { x: i32, y: i32 },

	#[error("No placed word with index {0}")]
	NoSuchWord(usize),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

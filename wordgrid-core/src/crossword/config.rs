use crate::errors::{Error, Result};

/// Tunable policy of the crossword placement engine.
///
/// # Responsibilities
/// - Bound the work done per board (`trials`, `max_words`, `attempts_per_anchor`)
/// - Control board selection (`finalists`)
/// - Control hint seeding (`hint_min_graphemes`)
///
/// # Invariants
/// - `trials >= 1` and `finalists >= 1`, enforced by [`GeneratorConfig::validate`]
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
	/// Number of independent trial boards built per generation.
	pub trials: usize,

	/// Maximum number of words placed on one trial board.
	pub max_words: usize,

	/// Number of words tried at one anchor before the anchor is abandoned.
	pub attempts_per_anchor: usize,

	/// Number of trials with the most words that compete on density.
	pub finalists: usize,

	/// Words with at least this many graphemes get one pre-filled cell.
	pub hint_min_graphemes: usize,
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self {
			trials: 5,
			max_words: 5,
			attempts_per_anchor: 25,
			finalists: 3,
			hint_min_graphemes: 3,
		}
	}
}

impl GeneratorConfig {
	/// Checks the invariants.
	///
	/// # Errors
	/// Returns `Error::InvalidConfig` when `trials` or `finalists` is zero.
	pub fn validate(&self) -> Result<()> {
		if self.trials == 0 {
			return Err(Error::InvalidConfig("trials must be >= 1".to_owned()));
		}
		if self.finalists == 0 {
			return Err(Error::InvalidConfig("finalists must be >= 1".to_owned()));
		}
		Ok(())
	}

	/// Sets the maximum number of words per board.
	///
	/// # Errors
	/// Returns an error if `max_words` is zero.
	pub fn set_max_words(&mut self, max_words: usize) -> Result<()> {
		if max_words == 0 {
			return Err(Error::InvalidConfig("max_words must be >= 1".to_owned()));
		}
		self.max_words = max_words;
		Ok(())
	}
}

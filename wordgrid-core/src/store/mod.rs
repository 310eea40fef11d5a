//! The word store collaborator.
//!
//! The tokenizer and the crossword board never own word data. They talk to a
//! [`WordStore`], which may sit on a database, a remote service or, for the
//! server and tests, the in-memory [`memory::MemoryWordStore`].

/// In-memory dictionaries loaded from `.dat` files.
pub mod memory;

/// Definition cache wrapping any store.
pub mod cache;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Definitions of one spelling, used as crossword hint text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Definitions {
	pub definitions: Vec<String>,
}

/// Filters applied by [`WordStore::list_candidate_words`].
///
/// Filtering belongs to the store; the crossword engine accepts whatever
/// word pool it is handed.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateFilter {
	/// Minimum length in grapheme clusters.
	pub min_graphemes: usize,
	/// Maximum length in grapheme clusters.
	pub max_graphemes: Option<usize>,
	/// Only words the learner is at most this confident about.
	pub max_confidence: Option<f32>,
	/// Maximum number of words returned.
	pub limit: Option<usize>,
}

impl Default for CandidateFilter {
	fn default() -> Self {
		Self {
			min_graphemes: 2,
			max_graphemes: None,
			max_confidence: None,
			limit: None,
		}
	}
}

/// Read access to the learner's dictionaries.
#[allow(async_fn_in_trait)]
pub trait WordStore {
	/// All spellings starting with `prefix` (case-insensitive), longest first.
	async fn list_words_starting_with(&self, dictionary_id: &str, prefix: &str) -> Result<Vec<String>>;

	/// Spellings matching `filter`, least practised first.
	async fn list_candidate_words(&self, dictionary_id: &str, filter: &CandidateFilter) -> Result<Vec<String>>;

	/// Definitions of `spelling`. Unknown spellings yield no definitions.
	async fn get_definitions(&self, dictionary_id: &str, spelling: &str) -> Result<Definitions>;
}

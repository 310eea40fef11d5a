use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use super::{Segment, Tokenizer};
use crate::errors::{Error, Result};
use crate::grapheme::{grapheme_count, graphemes};
use crate::store::WordStore;

/// Shared flag used to abandon an in-flight compound pass.
///
/// Clones observe the same flag. Set it when the text being tokenized
/// changes; the pass checks it before every mutation of its output.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}

	fn check(&self) -> Result<()> {
		if self.is_cancelled() { Err(Error::Cancelled) } else { Ok(()) }
	}
}

impl Tokenizer {
	/// Merges adjacent segments into known compound words.
	///
	/// For each adjacent pair, the store is asked for words starting with
	/// the text spanning both segments, longest first. The first candidate
	/// that prefix-matches the text at the first segment's offset and ends on
	/// a grapheme boundary replaces every segment it covers. A segment the
	/// match ends inside keeps its uncovered remainder.
	///
	/// # Parameters
	/// - `text`: the text `segments` were produced from (not lowercased).
	///
	/// # Errors
	/// Returns `Error::Cancelled` when `cancel` is set before the pass
	/// completes. Store failures are logged and treated as "no match".
	pub async fn merge_compounds<S>(
		&self,
		text: &str,
		segments: Vec<Segment>,
		store: &S,
		dictionary_id: &str,
		cancel: &CancelFlag,
	) -> Result<Vec<Segment>>
	where
		S: WordStore + ?Sized,
	{
		let lowered = text.to_lowercase();
		let boundaries: Vec<usize> = graphemes(&lowered).map(|g| g.offset).collect();
		let on_boundary = |end: usize| end == lowered.len() || boundaries.binary_search(&end).is_ok();
		let mut out = segments;

		let mut i = 0;
		while i + 1 < out.len() {
			cancel.check()?;

			let start = out[i].offset;
			let end = out[i + 1].end();
			let Some(span) = lowered.get(start..end) else {
				warn!("Segments {i}..={} do not fit the text, skipping compound lookup", i + 1);
				i += 1;
				continue;
			};

			let candidates = match store.list_words_starting_with(dictionary_id, span).await {
				Ok(candidates) => candidates,
				Err(e) => {
					warn!("Compound lookup for '{span}' failed: {e}");
					i += 1;
					continue;
				}
			};

			cancel.check()?;

			let rest = &lowered[start..];
			let matched = candidates
				.iter()
				.map(|c| c.to_lowercase())
				.find(|c| c.len() >= span.len() && rest.starts_with(c.as_str()) && on_boundary(start + c.len()));

			if let Some(word) = matched {
				debug!("Merging compound '{word}' at offset {start}");
				Self::merge_at(&mut out, i, start + word.len(), &lowered);
			}
			i += 1;
		}

		cancel.check()?;
		Ok(out)
	}

	/// Runs [`Tokenizer::tokenize`] followed by [`Tokenizer::merge_compounds`].
	pub async fn tokenize_with_compounds<S>(
		&self,
		text: &str,
		store: &S,
		dictionary_id: &str,
		cancel: &CancelFlag,
	) -> Result<Vec<Segment>>
	where
		S: WordStore + ?Sized,
	{
		let segments = self.tokenize(text);
		self.merge_compounds(text, segments, store, dictionary_id, cancel).await
	}

	/// Replaces the segments from `first` that start before `match_end` with
	/// one merged segment.
	fn merge_at(out: &mut Vec<Segment>, first: usize, match_end: usize, lowered: &str) {
		let start = out[first].offset;
		let mut last = first;
		while last + 1 < out.len() && out[last + 1].offset < match_end {
			last += 1;
		}

		let merged = Segment {
			text: lowered[start..match_end].to_owned(),
			index: out[first].index,
			offset: start,
			category: out[first].category,
		};

		let mut replacement = vec![merged];
		let tail = &out[last];
		if tail.end() > match_end {
			replacement.push(Segment {
				text: lowered[match_end..tail.end()].to_owned(),
				index: out[first].index + grapheme_count(&lowered[start..match_end]),
				offset: match_end,
				category: tail.category,
			});
		}

		out.splice(first..=last, replacement);
	}
}

//! Freeform text to dictionary-lookup candidates.
//!
//! Tokenization runs in two passes:
//! - a synchronous pass (`Tokenizer::tokenize`) that splits lowercased text
//!   on Unicode word boundaries, keeps word-like segments and carves leading
//!   particles off glued Hiragana runs
//! - an asynchronous pass (`Tokenizer::merge_compounds`) that asks the word
//!   store whether adjacent segments form a longer known word

/// Script categories and classification of word-boundary pieces.
pub mod script;

/// Compound-word merge pass and its cancellation flag.
pub mod compound;

use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::grapheme::{grapheme_count, graphemes};
use script::Category;

pub use compound::CancelFlag;

/// A span of text classified by script.
///
/// Offsets are byte offsets into the lowercased input; `index` counts
/// grapheme clusters from the start of that input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
	pub text: String,
	pub index: usize,
	pub offset: usize,
	pub category: Category,
}

impl Segment {
	/// Length in bytes.
	pub fn len(&self) -> usize {
		self.text.len()
	}

	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}

	/// Byte offset one past the end of the segment.
	pub fn end(&self) -> usize {
		self.offset + self.text.len()
	}

	pub fn grapheme_len(&self) -> usize {
		grapheme_count(&self.text)
	}
}

/// Word tokenizer for mixed-script text.
#[derive(Clone, Debug)]
pub struct Tokenizer {
	/// Split a leading Hiragana character off a Hiragana run glued to the
	/// previous word. On by default.
	pub split_particles: bool,
}

impl Default for Tokenizer {
	fn default() -> Self {
		Self { split_particles: true }
	}
}

/// A word-boundary piece before filtering.
struct Piece {
	start: usize,
	end: usize,
	category: Category,
}

impl Tokenizer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Tokenizes `text` into dictionary-lookup candidates.
	///
	/// The text is lowercased first. Punctuation, whitespace, digits and
	/// `Common`-script ideographic lookalikes are dropped.
	pub fn tokenize(&self, text: &str) -> Vec<Segment> {
		let lowered = text.to_lowercase();
		let starts: Vec<usize> = graphemes(&lowered).map(|g| g.offset).collect();

		let mut segments: Vec<Segment> = Vec::new();
		for piece in Self::pieces(&lowered) {
			if !Self::keep(&lowered[piece.start..piece.end], piece.category) {
				continue;
			}

			let segment = Segment {
				text: lowered[piece.start..piece.end].to_owned(),
				index: starts.partition_point(|&o| o < piece.start),
				offset: piece.start,
				category: piece.category,
			};

			let glued = segments.last().is_some_and(|prev| prev.end() == segment.offset);
			if self.split_particles && glued && segment.category == Category::Hiragana {
				let (particle, rest) = Self::split_particle(segment);
				segments.push(particle);
				segments.extend(rest);
			} else {
				segments.push(segment);
			}
		}
		segments
	}

	/// Runs the word-boundary pass and joins runs UAX #29 leaves split.
	fn pieces(text: &str) -> Vec<Piece> {
		let mut pieces: Vec<Piece> = Vec::new();
		for (start, word) in text.split_word_bound_indices() {
			let category = script::classify(word);
			let end = start + word.len();

			if let Some(prev) = pieces.last_mut() {
				let same_run = prev.category == category && category.coalesces();
				let kana_tail = category == Category::KanaExtension && prev.category.is_kana();
				if prev.end == start && (same_run || kana_tail) {
					prev.end = end;
					continue;
				}
			}
			pieces.push(Piece { start, end, category });
		}
		pieces
	}

	fn keep(text: &str, category: Category) -> bool {
		if !category.is_word() {
			return false;
		}
		if matches!(category, Category::Ideographic | Category::Unknown) {
			return match text.chars().next() {
				Some(c) => script::script_of(c) != icu_properties::props::Script::Common,
				None => false,
			};
		}
		true
	}

	/// Splits the first grapheme off `segment`.
	///
	/// A single-grapheme segment is returned whole with no remainder.
	fn split_particle(segment: Segment) -> (Segment, Option<Segment>) {
		let cut = match graphemes(&segment.text).nth(1) {
			Some(second) => second.offset,
			None => return (segment, None),
		};

		let rest = Segment {
			text: segment.text[cut..].to_owned(),
			index: segment.index + 1,
			offset: segment.offset + cut,
			category: segment.category,
		};
		let particle = Segment {
			text: segment.text[..cut].to_owned(),
			..segment
		};
		(particle, Some(rest))
	}
}

/// Texts of `segments`, in order.
pub fn texts(segments: &[Segment]) -> Vec<&str> {
	segments.iter().map(|s| s.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tokenize(text: &str) -> Vec<String> {
		Tokenizer::new()
			.tokenize(text)
			.into_iter()
			.map(|s| s.text)
			.collect()
	}

	#[test]
	fn japanese_sentence() {
		assert_eq!(tokenize("ようこそ！ポケモン世界へ"), vec!["ようこそ", "ポケモン", "世界", "へ"]);
	}

	#[test]
	fn mixed_latin_and_kana() {
		assert_eq!(tokenize("Language Dexへようこそ"), vec!["language", "dex", "へ", "ようこそ"]);
	}

	#[test]
	fn tokenization_is_stable() {
		let tokenizer = Tokenizer::new();
		let first = tokenizer.tokenize("AへへAへへ");
		let second = tokenizer.tokenize("AへへAへへ");
		assert_eq!(first, second);
		assert_eq!(texts(&first), vec!["a", "へ", "へ", "a", "へ", "へ"]);
	}

	#[test]
	fn drops_punctuation_digits_and_spaces() {
		assert_eq!(tokenize("Hello, world! 42 times."), vec!["hello", "world", "times"]);
		assert!(tokenize("  ...  ").is_empty());
		assert!(tokenize("").is_empty());
	}

	#[test]
	fn offsets_and_indices_point_into_lowercased_text() {
		let text = "Dexへようこそ";
		let lowered = text.to_lowercase();
		for segment in Tokenizer::new().tokenize(text) {
			assert_eq!(&lowered[segment.offset..segment.end()], segment.text);
		}
		let segments = Tokenizer::new().tokenize(text);
		assert_eq!(segments[0].index, 0);
		assert_eq!(segments[1].index, 3);
		assert_eq!(segments[2].index, 4);
		assert_eq!(segments[1].category, Category::Hiragana);
	}

	#[test]
	fn leading_hiragana_run_is_not_split() {
		assert_eq!(tokenize("ありがとう"), vec!["ありがとう"]);
		assert_eq!(tokenize("dex ようこそ"), vec!["dex", "ようこそ"]);
	}

	#[test]
	fn particle_split_can_be_disabled() {
		let tokenizer = Tokenizer { split_particles: false };
		assert_eq!(texts(&tokenizer.tokenize("dexへようこそ")), vec!["dex", "へようこそ"]);
	}

	#[test]
	fn prolonged_sound_mark_stays_in_kana_run() {
		assert_eq!(tokenize("ラーメン"), vec!["ラーメン"]);
	}

	#[test]
	fn common_script_ideograph_lookalikes_are_dropped() {
		// U+3006 is a letter in the Common script, classified `Unknown`.
		assert_eq!(script::classify("〆"), Category::Unknown);
		assert_eq!(tokenize("〆切"), vec!["切"]);
		assert_eq!(tokenize("世界〆"), vec!["世界"]);
	}

	#[test]
	fn hebrew_words_are_kept() {
		assert_eq!(tokenize("שלום עולם"), vec!["שלום", "עולם"]);
	}
}

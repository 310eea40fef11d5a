use icu_properties::CodePointMapData;
use icu_properties::props::Script;
use serde::Serialize;

/// Script category of a tokenizer segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	/// Letters of any alphabetic script without a dedicated variant.
	Letter,
	Hebrew,
	Katakana,
	Hiragana,
	/// Prolonged sound marks and voicing marks that extend a kana run.
	KanaExtension,
	/// Han ideographs.
	Ideographic,
	/// Letter-like content whose script could not be resolved.
	Unknown,
	Number,
	/// Punctuation, whitespace and symbols.
	Other,
}

impl Category {
	/// Whether segments of this category are dictionary-lookup candidates.
	pub fn is_word(self) -> bool {
		!matches!(self, Category::Number | Category::Other)
	}

	/// Categories whose UAX #29 pieces are single characters and must be
	/// joined back into runs.
	pub(crate) fn coalesces(self) -> bool {
		matches!(self, Category::Hiragana | Category::Ideographic)
	}

	pub(crate) fn is_kana(self) -> bool {
		matches!(self, Category::Hiragana | Category::Katakana | Category::KanaExtension)
	}
}

/// Unicode `Script` property of `c`.
pub fn script_of(c: char) -> Script {
	CodePointMapData::<Script>::new().get(c)
}

fn is_kana_extension(c: char) -> bool {
	matches!(c, '\u{30FC}' | '\u{FF70}' | '\u{3099}'..='\u{309C}' | '\u{FF9E}' | '\u{FF9F}')
}

/// Classifies a word-boundary piece by its dominant script.
///
/// Characters in the `Common` and `Inherited` scripts do not vote. A piece
/// with letters but no voting character is `Unknown`.
pub fn classify(piece: &str) -> Category {
	if !piece.is_empty() && piece.chars().all(is_kana_extension) {
		return Category::KanaExtension;
	}
	if !piece.chars().any(char::is_alphabetic) {
		return if piece.chars().any(char::is_numeric) {
			Category::Number
		} else {
			Category::Other
		};
	}

	let mut votes: Vec<(Script, usize)> = Vec::new();
	for c in piece.chars().filter(|c| c.is_alphabetic()) {
		let script = script_of(c);
		if script == Script::Common || script == Script::Inherited {
			continue;
		}
		match votes.iter_mut().find(|(s, _)| *s == script) {
			Some((_, count)) => *count += 1,
			None => votes.push((script, 1)),
		}
	}

	// Ties go to the script seen first.
	let mut dominant: Option<(Script, usize)> = None;
	for (script, count) in votes {
		if dominant.is_none_or(|(_, best)| count > best) {
			dominant = Some((script, count));
		}
	}

	match dominant.map(|(script, _)| script) {
		None => Category::Unknown,
		Some(Script::Hiragana) => Category::Hiragana,
		Some(Script::Katakana) => Category::Katakana,
		Some(Script::Han) => Category::Ideographic,
		Some(Script::Hebrew) => Category::Hebrew,
		Some(_) => Category::Letter,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_scripts() {
		assert_eq!(classify("dex"), Category::Letter);
		assert_eq!(classify("привет"), Category::Letter);
		assert_eq!(classify("שלום"), Category::Hebrew);
		assert_eq!(classify("ポケモン"), Category::Katakana);
		assert_eq!(classify("ラーメン"), Category::Katakana);
		assert_eq!(classify("へ"), Category::Hiragana);
		assert_eq!(classify("世"), Category::Ideographic);
		assert_eq!(classify("ー"), Category::KanaExtension);
	}

	#[test]
	fn punctuation_and_digits_are_not_words() {
		assert_eq!(classify("！"), Category::Other);
		assert_eq!(classify(" "), Category::Other);
		assert_eq!(classify("42"), Category::Number);
		assert!(!Category::Other.is_word());
		assert!(!Category::Number.is_word());
		assert!(Category::Unknown.is_word());
	}

	#[test]
	fn script_lookup() {
		assert_eq!(script_of('a'), Script::Latin);
		assert_eq!(script_of('世'), Script::Han);
		assert_eq!(script_of('！'), Script::Common);
	}
}

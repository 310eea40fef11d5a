//! Grapheme cluster segmentation.
//!
//! Word games compare and shuffle by what the player sees, so every letter
//! in this crate is an extended grapheme cluster rather than a `char`.

use std::iter::FusedIterator;

use unicode_segmentation::{GraphemeIndices, UnicodeSegmentation};

/// One user-perceived character borrowed from its source string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grapheme<'a> {
	/// The cluster itself.
	pub text: &'a str,
	/// Byte offset of the cluster in the source string.
	pub offset: usize,
}

impl<'a> Grapheme<'a> {
	/// Length of the cluster in bytes.
	pub fn len(&self) -> usize {
		self.text.len()
	}

	/// Clusters are never empty; kept for API symmetry with `len`.
	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}

	/// Byte offset one past the end of the cluster.
	pub fn end(&self) -> usize {
		self.offset + self.text.len()
	}
}

/// Lazy iterator over the grapheme clusters of a string.
///
/// Cloning forks the iterator at its current position; call [`graphemes`]
/// again to restart from the beginning.
#[derive(Clone)]
pub struct Graphemes<'a> {
	inner: GraphemeIndices<'a>,
}

impl<'a> Iterator for Graphemes<'a> {
	type Item = Grapheme<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|(offset, text)| Grapheme { text, offset })
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.inner.size_hint()
	}
}

impl<'a> DoubleEndedIterator for Graphemes<'a> {
	fn next_back(&mut self) -> Option<Self::Item> {
		self.inner.next_back().map(|(offset, text)| Grapheme { text, offset })
	}
}

impl FusedIterator for Graphemes<'_> {}

/// Segments `s` into extended grapheme clusters.
///
/// The clusters cover the input with no gaps or overlaps.
pub fn graphemes(s: &str) -> Graphemes<'_> {
	Graphemes { inner: s.grapheme_indices(true) }
}

/// Counts the grapheme clusters in `s`.
pub fn grapheme_count(s: &str) -> usize {
	s.graphemes(true).count()
}

/// Splits `s` into owned clusters.
pub fn split_graphemes(s: &str) -> Vec<String> {
	s.graphemes(true).map(str::to_owned).collect()
}

/// Joins a sequence of clusters back into a string.
///
/// `join(graphemes(s)) == s` for every `s`.
pub fn join<'a, I>(parts: I) -> String
where
	I: IntoIterator<Item = Grapheme<'a>>,
{
	parts.into_iter().map(|g| g.text).collect()
}

/// Reports whether `text` should be laid out right-to-left.
///
/// Always `false` for now: right-to-left scripts are not supported yet and
/// callers must not rely on this for Hebrew or Arabic content.
pub fn is_rtl(_text: &str) -> bool {
	false
}

/// Returns the clusters of `text` in display order.
pub fn display_order(text: &str) -> Vec<Grapheme<'_>> {
	let parts: Vec<Grapheme<'_>> = graphemes(text).collect();
	if is_rtl(text) {
		parts.into_iter().rev().collect()
	} else {
		parts
	}
}

use log::debug;
use rand::Rng;

use super::board::{CrosswordBoard, Orientation, Position};
use super::config::GeneratorConfig;
use crate::errors::Result;
use crate::grapheme::split_graphemes;
use crate::pick::{pick_index_unbiased, swap_to_end};

/// A position where the next word may be hooked onto the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Anchor {
	position: Position,
	orientation: Orientation,
}

/// A word of the input pool, split once into graphemes.
#[derive(Debug)]
struct Candidate {
	word: String,
	graphemes: Vec<String>,
}

/// Procedural crossword generator.
///
/// # Responsibilities
/// - Build `trials` independent boards by randomized word placement
/// - Pick the best board: most words first, then highest density
/// - Normalize the winner to portrait and seed one free letter per long word
///
/// # Notes
/// - Running out of anchors or words is not an error; an under-full board
///   competes on its own merits.
/// - Given the same random source, generation is fully reproducible.
#[derive(Clone, Debug, Default)]
pub struct CrosswordGenerator {
	config: GeneratorConfig,
}

impl CrosswordGenerator {
	/// Creates a generator with a validated configuration.
	///
	/// # Errors
	/// Returns `Error::InvalidConfig` if the configuration is invalid.
	pub fn new(config: GeneratorConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self { config })
	}

	pub fn config(&self) -> &GeneratorConfig {
		&self.config
	}

	/// Generates a board from `words` using the thread-local random source.
	pub fn generate<W: AsRef<str>>(&self, words: &[W]) -> CrosswordBoard {
		self.generate_with_rng(words, &mut rand::rng())
	}

	/// Generates a board from `words` using `rng` for every choice point.
	///
	/// Empty words are ignored; an empty pool yields an empty board.
	pub fn generate_with_rng<W, R>(&self, words: &[W], rng: &mut R) -> CrosswordBoard
	where
		W: AsRef<str>,
		R: Rng + ?Sized,
	{
		let candidates: Vec<Candidate> = words
			.iter()
			.map(|w| Candidate { word: w.as_ref().to_owned(), graphemes: split_graphemes(w.as_ref()) })
			.filter(|c| !c.graphemes.is_empty())
			.collect();

		let trials: Vec<CrosswordBoard> = (0..self.config.trials)
			.map(|trial| {
				let board = self.build_trial(&candidates, rng);
				debug!(
					"Trial {trial}: {} words, {}x{}, density {:.3}",
					board.words().len(),
					board.width(),
					board.height(),
					board.density()
				);
				board
			})
			.collect();

		let mut best = Self::select(trials, self.config.finalists);
		if best.width() > best.height() {
			best.transpose();
		}
		best.seed_hints(rng, self.config.hint_min_graphemes);
		best
	}

	/// Keeps the `finalists` boards with the most words, then returns the
	/// densest of those.
	///
	/// Both sorts are stable, so ties keep trial order.
	fn select(mut trials: Vec<CrosswordBoard>, finalists: usize) -> CrosswordBoard {
		trials.sort_by(|a, b| b.words().len().cmp(&a.words().len()));
		trials.truncate(finalists);
		trials.sort_by(|a, b| b.density().total_cmp(&a.density()));
		trials.into_iter().next().unwrap_or_default()
	}

	/// Builds one trial board.
	///
	/// `pool[..pool_len]` holds the indices of unplaced candidates. For each
	/// anchor, words are drawn from a shrinking prefix of that range, so a
	/// word that fails at one anchor stays available for the next.
	fn build_trial<R: Rng + ?Sized>(&self, candidates: &[Candidate], rng: &mut R) -> CrosswordBoard {
		let mut board = CrosswordBoard::empty();
		let mut pool: Vec<usize> = (0..candidates.len()).collect();
		let mut pool_len = pool.len();
		let mut anchors = vec![Anchor { position: Position::new(0, 0), orientation: Orientation::Horizontal }];

		while board.words().len() < self.config.max_words && pool_len > 0 {
			let Some(anchor) = Self::draw(&mut anchors, rng) else {
				break;
			};

			let mut remaining = pool_len;
			let mut attempts = 0;
			while attempts < self.config.attempts_per_anchor && remaining > 0 {
				attempts += 1;
				let Some(index) = pick_index_unbiased(rng, remaining) else {
					break;
				};
				let Some(&candidate) = swap_to_end(&mut pool, remaining, index) else {
					break;
				};
				remaining -= 1;

				let candidate = &candidates[candidate];
				let Some(start) = Self::find_placement(&board, &candidate.graphemes, anchor, rng) else {
					continue;
				};

				let created = board.place(&candidate.word, candidate.graphemes.clone(), start, anchor.orientation);
				anchors.extend(created.into_iter().map(|position| Anchor {
					position,
					orientation: anchor.orientation.opposite(),
				}));

				// Retire the placed word from the pool.
				pool.swap(remaining, pool_len - 1);
				pool_len -= 1;
				break;
			}
		}
		board
	}

	/// Removes a uniformly chosen anchor from the queue.
	fn draw<R: Rng + ?Sized>(anchors: &mut Vec<Anchor>, rng: &mut R) -> Option<Anchor> {
		let len = anchors.len();
		let index = pick_index_unbiased(rng, len)?;
		let anchor = *swap_to_end(anchors, len, index)?;
		anchors.pop();
		Some(anchor)
	}

	/// Chooses uniformly among the valid start positions of a word whose
	/// cells include `anchor`.
	fn find_placement<R: Rng + ?Sized>(
		board: &CrosswordBoard,
		graphemes: &[String],
		anchor: Anchor,
		rng: &mut R,
	) -> Option<Position> {
		let len = graphemes.len() as i32;
		let valid: Vec<Position> = (0..len)
			.map(|back| anchor.position.offset(anchor.orientation, -back))
			.filter(|&start| Self::fits(board, graphemes, start, anchor.orientation))
			.collect();
		let index = pick_index_unbiased(rng, valid.len())?;
		Some(valid[index])
	}

	/// Checks a placement against the board.
	///
	/// - the squares just before and after the word are empty
	/// - an occupied square must hold the same letter and not already be
	///   crossed in this orientation
	/// - an empty square must have no occupied neighbour across the word
	fn fits(board: &CrosswordBoard, graphemes: &[String], start: Position, orientation: Orientation) -> bool {
		let len = graphemes.len() as i32;
		if board.is_occupied(start.offset(orientation, -1)) || board.is_occupied(start.offset(orientation, len)) {
			return false;
		}

		let across = orientation.opposite();
		graphemes.iter().enumerate().all(|(i, grapheme)| {
			let p = start.offset(orientation, i as i32);
			match board.cell_at(p) {
				Some(cell) => cell.expected == *grapheme && !board.is_crossed(p, orientation),
				None => !board.is_occupied(p.offset(across, -1)) && !board.is_occupied(p.offset(across, 1)),
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn letters(word: &str) -> Vec<String> {
		split_graphemes(word)
	}

	#[test]
	fn first_word_covers_the_origin() {
		let generator = CrosswordGenerator::default();
		let mut rng = StdRng::seed_from_u64(5);
		let board = generator.build_trial(
			&[Candidate { word: "tiger".to_owned(), graphemes: letters("tiger") }],
			&mut rng,
		);
		assert_eq!(board.words().len(), 1);
		assert!(board.words()[0].cells.contains(&Position::new(0, 0)));
		assert_eq!(board.height(), 1);
		assert_eq!(board.width(), 5);
	}

	#[test]
	fn fits_rejects_run_ons_and_side_contact() {
		let mut board = CrosswordBoard::empty();
		board.place("cat", letters("cat"), Position::new(0, 0), Orientation::Horizontal);

		// Running into the end of "cat".
		assert!(!CrosswordGenerator::fits(&board, &letters("do"), Position::new(3, 0), Orientation::Horizontal));
		// Parallel word touching "cat" from below.
		assert!(!CrosswordGenerator::fits(&board, &letters("ox"), Position::new(0, 1), Orientation::Horizontal));
		// Crossing on a mismatched letter.
		assert!(!CrosswordGenerator::fits(&board, &letters("bed"), Position::new(1, -1), Orientation::Vertical));
		// Crossing on the shared "a".
		assert!(CrosswordGenerator::fits(&board, &letters("bag"), Position::new(1, -1), Orientation::Vertical));
		// Re-using the horizontal cells of "cat" in the same direction.
		assert!(!CrosswordGenerator::fits(&board, &letters("at"), Position::new(1, 0), Orientation::Horizontal));
	}

	#[test]
	fn placement_search_includes_the_anchor() {
		let mut board = CrosswordBoard::empty();
		board.place("cat", letters("cat"), Position::new(0, 0), Orientation::Horizontal);
		let anchor = Anchor { position: Position::new(1, 0), orientation: Orientation::Vertical };
		let mut rng = StdRng::seed_from_u64(11);
		let start = CrosswordGenerator::find_placement(&board, &letters("banana"), anchor, &mut rng).unwrap();
		// Any "a" of "banana" may sit on the anchor.
		assert_eq!(start.x, 1);
		assert!([-1, -3, -5].contains(&start.y));
		assert!(CrosswordGenerator::find_placement(&board, &letters("oxo"), anchor, &mut rng).is_none());
	}

	#[test]
	fn empty_pool_gives_empty_board() {
		let generator = CrosswordGenerator::default();
		let words: [&str; 0] = [];
		let board = generator.generate(&words);
		assert!(board.words().is_empty());
		assert_eq!(board.width(), 0);
		assert_eq!(board.height(), 0);

		let board = generator.generate(&["", ""]);
		assert!(board.cells().is_empty());
	}

	#[test]
	fn word_cap_is_respected() {
		let config = GeneratorConfig { max_words: 2, ..GeneratorConfig::default() };
		let generator = CrosswordGenerator::new(config).unwrap();
		let words = ["stone", "notes", "tones", "onset", "steno", "seton"];
		for seed in 0..20 {
			let board = generator.generate_with_rng(&words, &mut StdRng::seed_from_u64(seed));
			assert!(board.words().len() <= 2);
			assert!(!board.words().is_empty());
		}
	}

	/// A board of `count` horizontal words of `width` letters, `gap` rows apart.
	fn stacked(count: usize, width: usize, gap: i32) -> CrosswordBoard {
		let mut board = CrosswordBoard::empty();
		let word = "x".repeat(width);
		for row in 0..count as i32 {
			board.place(&word, letters(&word), Position::new(0, gap * row), Orientation::Horizontal);
		}
		board
	}

	#[test]
	fn selection_filters_by_word_count_before_density() {
		let densest_one = stacked(1, 3, 2); // 1.0
		let sparse_three = stacked(3, 2, 2); // 6 of 10
		let sparse_two = stacked(2, 4, 3); // 8 of 16
		let dense_two = stacked(2, 4, 2); // 8 of 12
		let trials = vec![densest_one, sparse_three.clone(), sparse_two, dense_two.clone()];

		assert_eq!(CrosswordGenerator::select(trials.clone(), 3), dense_two);
		assert_eq!(CrosswordGenerator::select(trials, 1), sparse_three);
		assert_eq!(CrosswordGenerator::select(Vec::new(), 3), CrosswordBoard::empty());
	}

	#[test]
	fn invalid_config_is_rejected() {
		let config = GeneratorConfig { trials: 0, ..GeneratorConfig::default() };
		assert!(CrosswordGenerator::new(config).is_err());
	}
}

//! Property tests for generated crosswords.
//!
//! Layouts have random choice points, so these tests check invariants over
//! many seeds rather than exact grids.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use wordgrid_core::crossword::{CrosswordBoard, CrosswordGenerator, Orientation};

const WORDS: &[&str] = &[
	"cat", "car", "art", "tar", "rat", "arc", "crate", "trace", "react", "cater", "carrot", "tractor",
	"actor", "coral", "carol", "altar",
];

fn boards(words: &[&str], seeds: u64) -> Vec<CrosswordBoard> {
	let generator = CrosswordGenerator::default();
	(0..seeds)
		.map(|seed| generator.generate_with_rng(words, &mut StdRng::seed_from_u64(seed)))
		.collect()
}

fn check_invariants(board: &CrosswordBoard) {
	let bounds = board.bounds();
	let mut seen = HashSet::new();

	for cell in board.cells() {
		// Lookup and cell list agree.
		let found = board.cell(cell.position.x, cell.position.y).expect("cell reachable by position");
		assert_eq!(found, cell);
		assert!(seen.insert(cell.position), "duplicate cell at {:?}", cell.position);

		assert!(bounds.contains(cell.position), "cell {:?} outside {:?}", cell.position, bounds);

		assert!(matches!(cell.words.len(), 1 | 2), "cell crossed by {} words", cell.words.len());
		for r in &cell.words {
			let word = &board.words()[r.word];
			assert_eq!(word.graphemes[r.letter], cell.expected);
			assert_eq!(word.cells[r.letter], cell.position);
		}
		if let [a, b] = cell.words.as_slice() {
			let (wa, wb) = (&board.words()[a.word], &board.words()[b.word]);
			assert_ne!(wa.orientation, wb.orientation);
			assert_eq!(wa.graphemes[a.letter], wb.graphemes[b.letter]);
		}
	}

	for word in board.words() {
		assert_eq!(word.cells.len(), word.graphemes.len());
		for pair in word.cells.windows(2) {
			let step = match word.orientation {
				Orientation::Horizontal => (pair[1].x - pair[0].x, pair[1].y - pair[0].y) == (1, 0),
				Orientation::Vertical => (pair[1].x - pair[0].x, pair[1].y - pair[0].y) == (0, 1),
			};
			assert!(step, "word {} is not contiguous", word.word);
		}
	}

	if !board.cells().is_empty() {
		// Tight bounds: every edge row and column holds a cell.
		let xs: Vec<i32> = board.cells().iter().map(|c| c.position.x).collect();
		let ys: Vec<i32> = board.cells().iter().map(|c| c.position.y).collect();
		assert_eq!(bounds.left, *xs.iter().min().unwrap());
		assert_eq!(bounds.right, *xs.iter().max().unwrap() + 1);
		assert_eq!(bounds.top, *ys.iter().min().unwrap());
		assert_eq!(bounds.bottom, *ys.iter().max().unwrap() + 1);
	}
}

#[test]
fn generated_boards_hold_invariants() {
	for board in boards(WORDS, 50) {
		check_invariants(&board);
		assert!(!board.words().is_empty());
		assert!(board.words().len() <= 5);
	}
}

#[test]
fn boards_are_portrait() {
	for board in boards(WORDS, 50) {
		assert!(board.height() >= board.width(), "{}x{}", board.width(), board.height());
	}
}

#[test]
fn generation_is_reproducible() {
	let generator = CrosswordGenerator::default();
	for seed in 0..10 {
		let a = generator.generate_with_rng(WORDS, &mut StdRng::seed_from_u64(seed));
		let b = generator.generate_with_rng(WORDS, &mut StdRng::seed_from_u64(seed));
		assert_eq!(a, b);
	}
}

#[test]
fn each_long_word_gets_one_free_letter() {
	for board in boards(WORDS, 30) {
		let locked = board.cells().iter().filter(|c| c.locked).count();
		let long_words = board.words().iter().filter(|w| w.graphemes.len() > 2).count();
		// Two words may pick the same shared cell.
		assert!(locked >= 1 && locked <= long_words);
		for cell in board.cells().iter().filter(|c| c.locked) {
			assert_eq!(cell.submitted.as_deref(), Some(cell.expected.as_str()));
		}
		for cell in board.cells().iter().filter(|c| !c.locked) {
			assert!(cell.submitted.is_none());
		}
	}
}

#[test]
fn short_words_get_no_free_letter() {
	let generator = CrosswordGenerator::default();
	let board = generator.generate_with_rng(&["ox", "xi", "ax"], &mut StdRng::seed_from_u64(1));
	check_invariants(&board);
	assert!(board.cells().iter().all(|c| !c.locked));
}

#[test]
fn cat_car_art_share_letters_consistently() {
	for board in boards(&["cat", "car", "art"], 40) {
		check_invariants(&board);
		let placed: HashSet<&str> = board.words().iter().map(|w| w.word.as_str()).collect();
		assert_eq!(placed.len(), board.words().len());
	}
}

#[test]
fn unplaceable_words_leave_an_under_full_board() {
	// No two words share a letter, so only the first one can be placed.
	let generator = CrosswordGenerator::default();
	let board = generator.generate_with_rng(&["abc", "def", "ghi"], &mut StdRng::seed_from_u64(3));
	assert_eq!(board.words().len(), 1);
	assert_eq!(board.width(), 1);
	assert_eq!(board.height(), 3);
}

#[test]
fn grapheme_words_are_placed_by_cluster() {
	let generator = CrosswordGenerator::default();
	let words = ["ポケモン", "モンスター", "ケーキ"];
	for seed in 0..10 {
		let board = generator.generate_with_rng(&words, &mut StdRng::seed_from_u64(seed));
		check_invariants(&board);
		for cell in board.cells() {
			assert_eq!(wordgrid_core::grapheme::grapheme_count(&cell.expected), 1);
		}
	}
}

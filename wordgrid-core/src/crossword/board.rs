use std::collections::HashMap;

use log::warn;
use rand::Rng;
use serde::Serialize;

use crate::errors::{Error, Result};
use crate::pick::pick_index_unbiased;
use crate::store::WordStore;

/// Hint text shown when the store has nothing for a word.
pub const FALLBACK_HINT: &str = "No hint available";

/// Signed grid coordinate. The board may extend into negative coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
	pub x: i32,
	pub y: i32,
}

impl Position {
	pub fn new(x: i32, y: i32) -> Self {
		Self { x, y }
	}

	/// The position `n` steps along `orientation`.
	pub fn offset(self, orientation: Orientation, n: i32) -> Self {
		match orientation {
			Orientation::Horizontal => Self::new(self.x + n, self.y),
			Orientation::Vertical => Self::new(self.x, self.y + n),
		}
	}

	fn transposed(self) -> Self {
		Self::new(self.y, self.x)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
	Horizontal,
	Vertical,
}

impl Orientation {
	pub fn opposite(self) -> Self {
		match self {
			Orientation::Horizontal => Orientation::Vertical,
			Orientation::Vertical => Orientation::Horizontal,
		}
	}
}

/// Reference from a cell to the letter of a word crossing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CellRef {
	/// Index into the board's word list.
	pub word: usize,
	/// Grapheme index within that word.
	pub letter: usize,
}

/// One grid square.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cell {
	pub position: Position,
	/// Words crossing this cell: one, or two of opposite orientation.
	pub words: Vec<CellRef>,
	/// The correct grapheme.
	pub expected: String,
	/// The grapheme entered by the player, if any.
	pub submitted: Option<String>,
	/// Pre-filled cells the player cannot edit.
	pub locked: bool,
}

impl Cell {
	pub fn is_correct(&self) -> bool {
		self.submitted.as_deref() == Some(self.expected.as_str())
	}
}

/// Progress of a word's hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintState {
	Unrevealed,
	Requested,
	Shown,
}

/// A word placed on the board.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedWord {
	pub word: String,
	pub graphemes: Vec<String>,
	pub orientation: Orientation,
	/// Positions of the word's cells in reading order.
	pub cells: Vec<Position>,
	pub hint: Option<String>,
	pub hint_state: HintState,
	pub hint_used: bool,
	pub conceded: bool,
}

/// Half-open bounding box `[left, right) x [top, bottom)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Bounds {
	pub top: i32,
	pub bottom: i32,
	pub left: i32,
	pub right: i32,
}

impl Bounds {
	pub fn width(&self) -> i32 {
		self.right - self.left
	}

	pub fn height(&self) -> i32 {
		self.bottom - self.top
	}

	pub fn contains(&self, p: Position) -> bool {
		p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
	}

	fn single(p: Position) -> Self {
		Self { top: p.y, bottom: p.y + 1, left: p.x, right: p.x + 1 }
	}

	fn extend(&mut self, p: Position) {
		self.top = self.top.min(p.y);
		self.bottom = self.bottom.max(p.y + 1);
		self.left = self.left.min(p.x);
		self.right = self.right.max(p.x + 1);
	}

	fn transposed(self) -> Self {
		Self { top: self.left, bottom: self.right, left: self.top, right: self.bottom }
	}
}

/// A generated crossword and its play state.
///
/// The board owns its cells; words refer to cells by position only.
///
/// # Invariants
/// - every cell is reachable through the position lookup and vice versa
/// - every cell lies inside `bounds`
/// - a cell is crossed by at most one word per orientation, and crossing
///   words agree on its letter
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CrosswordBoard {
	bounds: Bounds,
	cells: Vec<Cell>,
	#[serde(skip)]
	lookup: HashMap<Position, usize>,
	words: Vec<PlacedWord>,
	conceded_count: usize,
}

impl Default for CrosswordBoard {
	fn default() -> Self {
		Self::empty()
	}
}

impl CrosswordBoard {
	/// A board with no words and a zero-area bounding box.
	pub fn empty() -> Self {
		Self {
			bounds: Bounds::default(),
			cells: Vec::new(),
			lookup: HashMap::new(),
			words: Vec::new(),
			conceded_count: 0,
		}
	}

	pub fn bounds(&self) -> Bounds {
		self.bounds
	}

	pub fn width(&self) -> i32 {
		self.bounds.width()
	}

	pub fn height(&self) -> i32 {
		self.bounds.height()
	}

	pub fn cells(&self) -> &[Cell] {
		&self.cells
	}

	pub fn words(&self) -> &[PlacedWord] {
		&self.words
	}

	/// Filled cells divided by bounding-box area, 0 for an empty board.
	pub fn density(&self) -> f64 {
		let area = i64::from(self.width()) * i64::from(self.height());
		if area <= 0 {
			return 0.0;
		}
		self.cells.len() as f64 / area as f64
	}

	pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
		self.cell_at(Position::new(x, y))
	}

	pub fn cell_at(&self, p: Position) -> Option<&Cell> {
		self.lookup.get(&p).map(|&i| &self.cells[i])
	}

	fn cell_mut(&mut self, x: i32, y: i32) -> Result<&mut Cell> {
		match self.lookup.get(&Position::new(x, y)) {
			Some(&i) => Ok(&mut self.cells[i]),
			None => Err(Error::NoSuchCell { x, y }),
		}
	}

	pub fn is_occupied(&self, p: Position) -> bool {
		self.lookup.contains_key(&p)
	}

	/// Whether a word of `orientation` already crosses the cell at `p`.
	pub(crate) fn is_crossed(&self, p: Position, orientation: Orientation) -> bool {
		self.cell_at(p).is_some_and(|cell| {
			cell.words.iter().any(|r| self.words[r.word].orientation == orientation)
		})
	}

	/// Places a word starting at `start` and returns the newly created cells.
	///
	/// Cells already on the board are reused as intersections. Validity is
	/// the caller's concern.
	pub(crate) fn place(
		&mut self,
		word: &str,
		graphemes: Vec<String>,
		start: Position,
		orientation: Orientation,
	) -> Vec<Position> {
		let word_index = self.words.len();
		let mut path = Vec::with_capacity(graphemes.len());
		let mut created = Vec::new();

		for (letter, grapheme) in graphemes.iter().enumerate() {
			let p = start.offset(orientation, letter as i32);
			let reference = CellRef { word: word_index, letter };
			match self.lookup.get(&p) {
				Some(&i) => self.cells[i].words.push(reference),
				None => {
					if self.cells.is_empty() {
						self.bounds = Bounds::single(p);
					} else {
						self.bounds.extend(p);
					}
					self.lookup.insert(p, self.cells.len());
					self.cells.push(Cell {
						position: p,
						words: vec![reference],
						expected: grapheme.clone(),
						submitted: None,
						locked: false,
					});
					created.push(p);
				}
			}
			path.push(p);
		}

		self.words.push(PlacedWord {
			word: word.to_owned(),
			graphemes,
			orientation,
			cells: path,
			hint: None,
			hint_state: HintState::Unrevealed,
			hint_used: false,
			conceded: false,
		});
		created
	}

	/// Swaps x and y everywhere, turning a landscape board into a portrait one.
	pub(crate) fn transpose(&mut self) {
		self.bounds = self.bounds.transposed();
		self.lookup.clear();
		for (i, cell) in self.cells.iter_mut().enumerate() {
			cell.position = cell.position.transposed();
			self.lookup.insert(cell.position, i);
		}
		for word in &mut self.words {
			word.orientation = word.orientation.opposite();
			for p in &mut word.cells {
				*p = p.transposed();
			}
		}
	}

	/// Locks one random cell of every word with at least `min_graphemes`
	/// graphemes and pre-fills it with its expected letter.
	pub(crate) fn seed_hints<R: Rng + ?Sized>(&mut self, rng: &mut R, min_graphemes: usize) {
		for w in 0..self.words.len() {
			let word = &self.words[w];
			if word.graphemes.len() < min_graphemes {
				continue;
			}
			let Some(k) = pick_index_unbiased(rng, word.cells.len()) else {
				continue;
			};
			let p = word.cells[k];
			if let Some(&i) = self.lookup.get(&p) {
				let cell = &mut self.cells[i];
				cell.locked = true;
				cell.submitted = Some(cell.expected.clone());
			}
		}
	}

	/// Enters `grapheme` into the cell at `(x, y)`.
	///
	/// # Errors
	/// Fails on a missing or locked cell.
	pub fn submit(&mut self, x: i32, y: i32, grapheme: &str) -> Result<()> {
		let cell = self.cell_mut(x, y)?;
		if cell.locked {
			return Err(Error::LockedCell { x, y });
		}
		cell.submitted = Some(grapheme.to_owned());
		Ok(())
	}

	/// Erases the player's entry at `(x, y)`.
	pub fn clear(&mut self, x: i32, y: i32) -> Result<()> {
		let cell = self.cell_mut(x, y)?;
		if cell.locked {
			return Err(Error::LockedCell { x, y });
		}
		cell.submitted = None;
		Ok(())
	}

	fn word(&self, index: usize) -> Result<&PlacedWord> {
		self.words.get(index).ok_or(Error::NoSuchWord(index))
	}

	/// Whether every cell of word `index` holds its expected letter.
	pub fn is_word_solved(&self, index: usize) -> Result<bool> {
		let word = self.word(index)?;
		Ok(word.cells.iter().all(|p| self.cell_at(*p).is_some_and(Cell::is_correct)))
	}

	pub fn is_solved(&self) -> bool {
		self.cells.iter().all(Cell::is_correct)
	}

	/// Words solved by the player, excluding conceded ones.
	pub fn solved_count(&self) -> usize {
		(0..self.words.len())
			.filter(|&i| !self.words[i].conceded && self.is_word_solved(i).unwrap_or(false))
			.count()
	}

	pub fn conceded_count(&self) -> usize {
		self.conceded_count
	}

	/// Gives up on word `index`: fills and locks all of its cells.
	///
	/// Conceding twice counts once.
	pub fn concede(&mut self, index: usize) -> Result<()> {
		let path = self.word(index)?.cells.clone();
		for p in path {
			if let Some(&i) = self.lookup.get(&p) {
				let cell = &mut self.cells[i];
				cell.submitted = Some(cell.expected.clone());
				cell.locked = true;
			}
		}
		let word = &mut self.words[index];
		if !word.conceded {
			word.conceded = true;
			self.conceded_count += 1;
		}
		Ok(())
	}

	/// Returns the hint of word `index`, fetching it on first request.
	///
	/// The text is the word's first definition. Store failures and words
	/// without definitions show [`FALLBACK_HINT`].
	pub async fn request_hint<S>(&mut self, index: usize, store: &S, dictionary_id: &str) -> Result<String>
	where
		S: WordStore + ?Sized,
	{
		let word = self.words.get_mut(index).ok_or(Error::NoSuchWord(index))?;
		if word.hint_state == HintState::Shown {
			if let Some(hint) = &word.hint {
				return Ok(hint.clone());
			}
		}

		word.hint_state = HintState::Requested;
		let spelling = word.word.clone();
		let hint = match store.get_definitions(dictionary_id, &spelling).await {
			Ok(found) => found.definitions.into_iter().next(),
			Err(e) => {
				warn!("Hint lookup for '{spelling}' failed: {e}");
				None
			}
		}
		.unwrap_or_else(|| FALLBACK_HINT.to_owned());

		self.record_hint(index, &hint)?;
		Ok(hint)
	}

	/// Shows `hint` for word `index` and marks the hint as used.
	pub fn record_hint(&mut self, index: usize, hint: &str) -> Result<()> {
		let word = self.words.get_mut(index).ok_or(Error::NoSuchWord(index))?;
		word.hint = Some(hint.to_owned());
		word.hint_state = HintState::Shown;
		word.hint_used = true;
		Ok(())
	}

	/// Renders the grid row by row.
	///
	/// Empty squares are `.`; cells show the submitted letter, or `_` when
	/// unset. With `reveal`, cells show their expected letter instead.
	pub fn render(&self, reveal: bool) -> String {
		let mut out = String::new();
		for y in self.bounds.top..self.bounds.bottom {
			for x in self.bounds.left..self.bounds.right {
				match self.cell(x, y) {
					Some(cell) if reveal => out.push_str(&cell.expected),
					Some(cell) => out.push_str(cell.submitted.as_deref().unwrap_or("_")),
					None => out.push('.'),
				}
			}
			out.push('\n');
		}
		out
	}
}

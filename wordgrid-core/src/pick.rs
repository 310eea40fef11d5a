//! Random index pickers and draw-without-replacement primitives.
//!
//! The removal primitives work over the live prefix `[0, len)` of a slice.
//! A removed element is parked at slot `len - 1` and the caller shrinks its
//! logical length by one, so a working set can be drawn down without
//! reallocating.

use rand::Rng;

/// Exponent applied to the uniform sample in [`pick_index_biased`].
const BIAS_EXPONENT: f64 = 8.0 / 5.0;

/// Picks an index in `[0, len)` with a skewed distribution.
///
/// Computes `floor(u^(8/5) * len)` with `u` uniform in `[0, 1)`. Since
/// `u^(8/5) <= u`, low indices come up more often than high ones.
/// Returns `None` when `len == 0`.
pub fn pick_index_biased<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
	if len == 0 {
		return None;
	}
	let u: f64 = rng.random();
	let index = (u.powf(BIAS_EXPONENT) * len as f64).floor() as usize;
	// Guard against rounding at the upper edge.
	Some(index.min(len - 1))
}

/// Picks an index uniformly in `[0, len)`. Returns `None` when `len == 0`.
pub fn pick_index_unbiased<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
	if len == 0 {
		return None;
	}
	let u: f64 = rng.random();
	let index = (u * len as f64).floor() as usize;
	Some(index.min(len - 1))
}

/// Removes `list[index]` from the live prefix in O(1).
///
/// The target is swapped with the last live element, so the relative order
/// of the remaining elements is not preserved. Returns the removed element,
/// now at slot `len - 1`, or `None` when `index` is outside the live prefix.
pub fn swap_to_end<T>(list: &mut [T], len: usize, index: usize) -> Option<&T> {
	let len = len.min(list.len());
	if index >= len {
		return None;
	}
	list.swap(index, len - 1);
	Some(&list[len - 1])
}

/// Removes `list[index]` from the live prefix in O(n), preserving the
/// relative order of the remaining elements.
///
/// Returns the removed element, now at slot `len - 1`, or `None` when
/// `index` is outside the live prefix.
pub fn shift_to_end<T>(list: &mut [T], len: usize, index: usize) -> Option<&T> {
	let len = len.min(list.len());
	if index >= len {
		return None;
	}
	list[index..len].rotate_left(1);
	Some(&list[len - 1])
}

/// Draws up to `n` elements with [`swap_to_end`], asking `pick` for an index
/// into the shrinking live prefix each time.
///
/// Drawing more elements than are live returns only the live ones.
pub fn swap_n_to_end_with<T, F>(list: &mut [T], len: usize, n: usize, pick: F) -> Vec<T>
where
	T: Clone,
	F: FnMut(usize) -> usize,
{
	draw_n(list, len, n, pick, swap_to_end)
}

/// Draws up to `n` elements with [`shift_to_end`], asking `pick` for an index
/// into the shrinking live prefix each time.
pub fn shift_n_to_end_with<T, F>(list: &mut [T], len: usize, n: usize, pick: F) -> Vec<T>
where
	T: Clone,
	F: FnMut(usize) -> usize,
{
	draw_n(list, len, n, pick, shift_to_end)
}

fn draw_n<T, F>(
	list: &mut [T],
	len: usize,
	n: usize,
	mut pick: F,
	remove: for<'a> fn(&'a mut [T], usize, usize) -> Option<&'a T>,
) -> Vec<T>
where
	T: Clone,
	F: FnMut(usize) -> usize,
{
	let mut live = len.min(list.len());
	let mut drawn = Vec::with_capacity(n.min(live));
	while drawn.len() < n && live > 0 {
		let index = pick(live);
		match remove(list, live, index) {
			Some(item) => drawn.push(item.clone()),
			None => break,
		}
		live -= 1;
	}
	drawn
}

/// Draws `n` game words from `pool` with [`pick_index_biased`].
///
/// Stores hand back candidates least practised first, so those are drawn
/// more often. The pool keeps the drawn words at its tail in reverse draw
/// order.
pub fn draw_words_biased<R: Rng + ?Sized>(pool: &mut [String], n: usize, rng: &mut R) -> Vec<String> {
	let len = pool.len();
	shift_n_to_end_with(pool, len, n, |live| pick_index_biased(&mut *rng, live).unwrap_or(0))
}

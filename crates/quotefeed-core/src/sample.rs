//! The single source of feed randomness.
//!
//! Stores rank candidates in a deterministic order; which ranks are fetched
//! and how the result is shuffled is decided here, with a caller-supplied RNG.

use rand::{
  Rng,
  seq::{SliceRandom, index},
};

/// Shuffle `items` in place (Fisher-Yates).
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
  items.shuffle(rng);
}

/// Draw up to `cap` distinct ranks out of `0..len` uniformly, in random order.
pub fn ranks<R: Rng + ?Sized>(len: usize, cap: usize, rng: &mut R) -> Vec<usize> {
  index::sample(rng, len, cap.min(len)).into_vec()
}

//! Random page selection.
//!
//! Repeated searches for the same genre land on different pages of the
//! popularity-sorted corpus, which is what makes asking the clerk again turn
//! up different records. Only album-level deduplication is guaranteed; two
//! searches may well pick the same page.

use rand::Rng;

/// Rows to request so that `count` albums survive dedup and hydration
/// losses.
pub fn fetch_count(count: usize, excluded: usize, margin: usize) -> usize {
    count + excluded + margin
}

/// Number of full pages the corpus holds at `fetch_count` rows per page,
/// at least 1 and at most `cap`.
pub fn max_page(num_found: u64, fetch_count: usize, cap: u64) -> u64 {
    let per_page = fetch_count.max(1) as u64;
    (num_found / per_page).max(1).min(cap.max(1))
}

/// Uniform pick in `[1, max_page]`.
pub fn pick_page<R: Rng + ?Sized>(rng: &mut R, max_page: u64) -> u64 {
    rng.gen_range(1..=max_page.max(1))
}

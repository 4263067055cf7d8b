//! Wrap-around paging arithmetic for the phase cycle
//!
//! A paging UI renders the six phases plus two sentinel "wrap" pages at
//! index 0 and `phase_count + 1`. Swiping past either end lands on a
//! sentinel; `adjusted_selection` snaps the sentinel to the opposite
//! real page so the wrap is invisible, and `normalized_index` converts
//! the one-based page selection to a zero-based phase index.
//!
//! Callers must guard `phase_count >= 1`; zero is rejected before these
//! functions are reached.

/// Snap a page selection onto the real page range `[1, phase_count]`.
///
/// Selection 0 (the leading sentinel) maps to the last page and
/// `phase_count + 1` (the trailing sentinel) maps to the first page.
/// Everything else passes through unchanged.
pub fn adjusted_selection(selection: usize, phase_count: usize) -> usize {
    debug_assert!(phase_count >= 1, "phase_count must be at least 1");
    if selection == 0 {
        phase_count
    } else if selection == phase_count + 1 {
        1
    } else {
        selection
    }
}

/// Convert a one-based page selection into a zero-based phase index in
/// `[0, phase_count)`.
pub fn normalized_index(selection: usize, phase_count: usize) -> usize {
    debug_assert!(phase_count >= 1, "phase_count must be at least 1");
    (selection + phase_count - 1) % phase_count
}

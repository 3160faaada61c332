//! Round-robin selection of the first live candidate.

use std::collections::HashMap;

/// Pick the first live candidate index, scanning round-robin from `start`
/// and wrapping once.
///
/// The current index is sticky: the scan begins at it, so a still-live
/// current candidate keeps its slot and the order of later candidates only
/// matters once it dies. Indices missing from `results` count as dead.
/// Returns `None` when no candidate is live; an out-of-range `start`
/// (left behind by a shrinking reload) is treated as 0.
pub fn pick_live(len: usize, start: usize, results: &HashMap<usize, bool>) -> Option<usize> {
    if len == 0 {
        return None;
    }

    let start = if start < len { start } else { 0 };

    (0..len)
        .map(|offset| (start + offset) % len)
        .find(|idx| results.get(idx).copied().unwrap_or(false))
}

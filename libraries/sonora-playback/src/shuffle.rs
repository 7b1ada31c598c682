//! Shuffle selection
//!
//! Shuffle never reorders identifiers in place; it only decides which
//! pending queue entry plays next.

use rand::Rng;

/// Pick a uniformly random index in `0..len`
///
/// Returns 0 for an empty range.
pub fn pick_index(len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    rand::thread_rng().gen_range(0..len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn degenerate_ranges() {
        assert_eq!(pick_index(0), 0);
        assert_eq!(pick_index(1), 0);
    }

    #[test]
    fn stays_in_range_and_covers_it() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let index = pick_index(4);
            assert!(index < 4);
            seen.insert(index);
        }
        // 1000 draws over 4 slots: missing one is astronomically unlikely
        assert_eq!(seen.len(), 4);
    }
}

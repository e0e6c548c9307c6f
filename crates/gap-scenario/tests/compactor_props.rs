use std::collections::BTreeSet;

use gap_scenario::{compact, expand};
use proptest::prelude::*;

fn cells() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..4, 0usize..64), 0..200)
}

proptest! {
    #[test]
    fn coverage_roundtrips(input in cells()) {
        let blocks = compact(input.iter().copied());
        let covered: BTreeSet<(usize, usize)> = expand(&blocks).into_iter().collect();
        let expected: BTreeSet<(usize, usize)> = input.into_iter().collect();
        prop_assert_eq!(covered, expected);
    }

    #[test]
    fn blocks_are_sorted_disjoint_and_non_adjacent(input in cells()) {
        let blocks = compact(input);
        for block in &blocks {
            prop_assert!(block.length >= 1);
        }
        for pair in blocks.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!((a.column, a.start) < (b.column, b.start));
            if a.column == b.column {
                prop_assert!(a.end() < b.start);
            }
        }
    }

    #[test]
    fn input_order_is_irrelevant(mut input in cells()) {
        let forward = compact(input.iter().copied());
        input.reverse();
        prop_assert_eq!(forward, compact(input));
    }
}

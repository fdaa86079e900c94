//! Shrink function properties
//!
//! Shrink candidates must always be simpler than the value they came from,
//! and repeatedly taking the first failing candidate must converge.

use crate::assert_passes;
use lodestar::*;

/// Property: every candidate from `towards` is strictly closer to the target
pub fn test_towards_candidates_approach_target() {
    let prop = Property::for_all2(
        Gen::<i64>::int_range(-1000, 1000),
        Gen::<i64>::int_range(-1000, 1000),
        |&value, &target| {
            let (value, target) = (value as i128, target as i128);
            let candidates: Vec<i128> = shrink::towards(target)(&value).collect();

            if value == target {
                return candidates.is_empty();
            }

            let mut unique = candidates.clone();
            unique.dedup();

            candidates.first() == Some(&target)
                && unique.len() == candidates.len()
                && candidates
                    .iter()
                    .all(|c| (c - target).abs() < (value - target).abs())
        },
    );

    assert_passes(prop, "Towards approaches target");
}

/// Property: greedily following `towards` finds the exact threshold
pub fn test_towards_reaches_any_threshold() {
    let prop = Property::for_all2(
        Gen::<i64>::int_range(0, 10_000),
        Gen::<i64>::int_range(0, 10_000),
        |&start, &threshold| {
            let (start, threshold) = (start.max(threshold) as i128, threshold as i128);
            let shrink = shrink::towards(0);

            let mut current = start;
            while let Some(next) = shrink(&current).find(|&c| c >= threshold) {
                current = next;
            }
            current == threshold
        },
    );

    assert_passes(prop, "Towards reaches threshold");
}

/// Property: structural list shrinks only ever remove elements
pub fn test_list_shrinks_are_shorter() {
    let prop = for_all(Gen::list_of(Gen::<u8>::int_range(0, 5), 0, 30), |items: &Vec<u8>| {
        let halves: Vec<Vec<u8>> = shrink::bisect(0)(items).collect();
        let removals: Vec<Vec<u8>> = shrink::drop_one(0)(items).collect();

        let halves_ok = halves.iter().map(Vec::len).sum::<usize>() == if halves.is_empty() { 0 } else { items.len() };
        let removals_ok = removals.iter().all(|candidate| candidate.len() + 1 == items.len());
        let distinct_ok = removals.len() <= items.len() && (items.is_empty() || !removals.is_empty());

        halves_ok && removals_ok && distinct_ok
    });

    assert_passes(prop, "List shrinks are shorter");
}

/// Property: `towards_count` proposes the smallest collections first
pub fn test_towards_count_sizes() {
    let prop = for_all(Gen::list_of(Gen::<u8>::int_range(0, 100), 0, 8), |items: &Vec<u8>| {
        let candidates: Vec<Vec<u8>> = shrink::towards_count(1, |x: &u8| *x)(items).collect();

        if items.len() <= 1 {
            return candidates.is_empty();
        }

        let lengths: Vec<usize> = candidates.iter().map(Vec::len).collect();
        lengths.first() == Some(&1)
            && lengths.windows(2).all(|pair| pair[0] <= pair[1])
            && lengths.iter().all(|&len| len < items.len())
    });

    assert_passes(prop, "Towards count orders by size");
}

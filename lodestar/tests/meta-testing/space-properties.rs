//! Example space properties
//!
//! Spaces are walked lazily and many times over; these properties make sure
//! every walk sees the same structure.

use crate::{arbitrary_params, assert_passes};
use lodestar::*;

fn child_ids<T: Clone + 'static>(space: &ExampleSpace<T>) -> Vec<ExampleId> {
    space.subspace().map(|child| child.current.id).collect()
}

/// Property: walking a subspace twice yields the same children
pub fn test_subspace_is_restartable() {
    let prop = for_all(arbitrary_params(), |&params: &GenParameters| {
        let gen = Gen::list_of(Gen::<i32>::int_range(-50, 50), 0, 10);
        match gen.first_space(params) {
            Ok(space) => {
                let first = child_ids(&space);
                let second = child_ids(&space);
                let regenerated = gen.first_space(params).map(|again| child_ids(&again));
                first == second && regenerated == Ok(first)
            }
            Err(_) => false,
        }
    });

    assert_passes(prop, "Subspace is restartable");
}

/// Property: every counterexample path leads back to its node
pub fn test_navigate_follows_counterexample_paths() {
    let prop = for_all(arbitrary_params(), |&params: &GenParameters| {
        let Ok(space) = Gen::<i64>::int_range(0, 1000).first_space(params) else {
            return false;
        };

        space
            .counterexamples(|&x| x < 100)
            .take(50)
            .all(|found| match space.navigate(&found.path) {
                Some(node) => node.current.id == found.space.current.id && node.current.value >= 100,
                None => false,
            })
    });

    assert_passes(prop, "Navigate follows paths");
}

/// Property: integer simplifications are never further from the origin
pub fn test_integer_distances_shrink() {
    let prop = for_all(arbitrary_params(), |&params: &GenParameters| {
        let Ok(space) = Gen::<i32>::int_range(-500, 500).first_space(params) else {
            return false;
        };

        let root = space.current.distance;
        (0.0..=100.0).contains(&root)
            && space.subspace().all(|child| {
                child.current.distance <= root && child.current.value.abs() < space.current.value.abs()
            })
    });

    assert_passes(prop, "Integer distances shrink");
}

/// Property: a filtered space holds no rejected value at any depth
pub fn test_filter_prunes_everywhere() {
    let prop = for_all(arbitrary_params(), |&params: &GenParameters| {
        let Ok(space) = Gen::<i32>::int_range(0, 200).first_space(params) else {
            return false;
        };

        match space.filter(|x| x % 3 != 1) {
            Some(filtered) => filtered.traverse().take(500).all(|x| x % 3 != 1),
            None => space.current.value % 3 == 1,
        }
    });

    assert_passes(prop, "Filter prunes everywhere");
}

//! Generator invariant properties
//!
//! These properties ensure that generators are deterministic, respect their
//! bounds, and that the combinators obey the laws they promise.

use crate::{arbitrary_params, arbitrary_seed, assert_passes};
use lodestar::*;

/// Property: the same parameters always produce the same space
pub fn test_generator_determinism() {
    let prop = for_all(arbitrary_params(), |&params: &GenParameters| {
        let gen = Gen::list_of(Gen::<i32>::int_range(0, 100), 0, 10);
        match (gen.first_space(params), gen.first_space(params)) {
            (Ok(a), Ok(b)) => a.current.value == b.current.value && a.current.id == b.current.id,
            _ => false,
        }
    });

    assert_passes(prop, "Generator determinism");
}

/// Property: integers stay inside their range for any parameters
pub fn test_int_range_bounds() {
    let prop = Property::for_all2(
        arbitrary_params(),
        Gen::<i16>::int_range(-300, 300),
        |&params, &min| {
            let max = min.saturating_add(250);
            let gen = Gen::<i16>::int_range(min, max);
            gen.run(params).take(20).all(|iteration| match iteration {
                GenIteration::Instance { space, .. } => (min..=max).contains(space.value()),
                _ => false,
            })
        },
    );

    assert_passes(prop, "Int range bounds");
}

/// Property: list lengths stay inside their bounds, at every shrink too
pub fn test_list_length_bounds() {
    let prop = for_all(arbitrary_params(), |&params: &GenParameters| {
        let gen = Gen::list_of(Gen::bool(), 2, 6);
        match gen.first_space(params) {
            Ok(space) => space.traverse().take(300).all(|xs| (2..=6).contains(&xs.len())),
            Err(_) => false,
        }
    });

    assert_passes(prop, "List length bounds");
}

/// Property: `element` only picks from its choices and shrinks to the first
pub fn test_element_membership() {
    let choices = vec!["red", "green", "blue"];
    let prop = for_all(arbitrary_params(), move |&params: &GenParameters| {
        let gen = Gen::element(choices.clone());
        match gen.first_space(params) {
            Ok(space) => {
                let values: Vec<&str> = space.traverse().collect();
                values.iter().all(|v| choices.contains(v))
                    && (space.current.distance == 0.0 || values.contains(&"red"))
            }
            Err(_) => false,
        }
    });

    assert_passes(prop, "Element membership");
}

/// Property: mapping twice is mapping the composition
pub fn test_map_composition() {
    let prop = for_all(arbitrary_seed(), |&seed: &Seed| {
        let params = GenParameters::new(seed, Size::new(60));
        let base = Gen::<i32>::int_range(-1000, 1000);

        let twice = base.clone().map(|x| x * 2).map(|x| x + 1);
        let composed = base.map(|x| x * 2 + 1);

        match (twice.first_space(params), composed.first_space(params)) {
            (Ok(a), Ok(b)) => a.traverse().take(50).eq(b.traverse().take(50)),
            _ => false,
        }
    });

    assert_passes(prop, "Map composition");
}

/// Property: a bound generator sees the upstream value, even while shrinking
pub fn test_bind_dependency() {
    let prop = for_all(arbitrary_params(), |&params: &GenParameters| {
        let gen = Gen::<usize>::int_range(0, 8).bind(|&n| {
            Gen::list_of(Gen::constant(n), n, n).map(move |xs| (n, xs.clone()))
        });

        match gen.first_space(params) {
            Ok(space) => space
                .traverse()
                .take(200)
                .all(|(n, xs)| xs.len() == n && xs.iter().all(|&x| x == n)),
            Err(_) => false,
        }
    });

    assert_passes(prop, "Bind dependency");
}

/// Property: filtered generators never yield rejected values
pub fn test_filter_soundness() {
    let prop = for_all(arbitrary_params(), |&params: &GenParameters| {
        let gen = Gen::<u32>::int_range(0, 1000).filter(|x| x % 5 == 0);
        gen.run(params).take(30).all(|iteration| match iteration {
            GenIteration::Instance { space, .. } => space.traverse().take(100).all(|x| x % 5 == 0),
            GenIteration::Discard { .. } => true,
            GenIteration::Error { .. } => false,
        })
    });

    assert_passes(prop, "Filter soundness");
}

//! Check loop scenarios
//!
//! Whole runs of the engine against properties with a known minimal
//! counterexample.

use crate::{arbitrary_seed, assert_passes, init_logging};
use lodestar::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Property: `x < 50` over `[0, 100]` shrinks to exactly 50 for every seed
pub fn test_integer_threshold_for_every_seed() {
    let prop = for_all(arbitrary_seed(), |&seed: &Seed| {
        let inner = Property::for_all(Gen::<i32>::int_range(0, 100), |&x| x < 50);
        match inner.check(&Config::default().with_seed(seed.0)) {
            Ok(report) => {
                !report.passed
                    && report.counterexample.map(|c| c.value) == Some(50)
                    && report.replay_token.is_some()
            }
            Err(_) => false,
        }
    });

    assert_passes(prop, "Integer threshold");
}

/// A list of small numbers whose sum reaches 100.
///
/// The size is pinned just below the maximum so the run keeps searching after
/// its first counterexample. Every failing list the property sees is recorded,
/// and the reported one must be no longer than any of them.
pub fn test_list_sum_scenario() {
    init_logging();

    let failing_lengths = Rc::new(RefCell::new(Vec::new()));
    let seen = failing_lengths.clone();
    let gen = Gen::list_of(Gen::<i32>::int_range(0, 10), 0, 20);
    let prop = for_all(gen, move |xs: &Vec<i32>| {
        let small = xs.iter().sum::<i32>() < 100;
        if !small {
            seen.borrow_mut().push(xs.len());
        }
        small
    })
    .named("small sums");
    let config = Config::default()
        .with_seed(77)
        .with_size(Size::new(99))
        .with_resize(ResizeStrategy::Fixed)
        .with_iterations(2000);
    let report = prop.check(&config).expect("check runs");
    let observed = failing_lengths.borrow().clone();

    assert!(!report.passed, "Expected a counterexample: {report}");
    assert!(matches!(
        report.termination,
        TerminationReason::ReachedShrinkLimit
            | TerminationReason::ReachedMaximumIterations
            | TerminationReason::FoundPragmaticSmallestCounterexample
    ));
    assert!(report.shrinks > 0);

    let counterexample = report.counterexample.clone().expect("counterexample");
    let sum: i32 = counterexample.value.iter().sum();
    assert!(sum >= 100);
    assert!(counterexample.value.iter().all(|x| (0..=10).contains(x)));
    let shortest = observed.iter().copied().min().expect("failing lists were seen");
    assert!(
        counterexample.value.len() <= shortest,
        "Reported length {} but a failing list of length {shortest} was seen",
        counterexample.value.len()
    );

    let output = report.to_string();
    assert!(output.contains("✗ small sums failed"));
    assert!(output.contains("Replay:"));

    let token = report.replay_token.clone().expect("replay token");
    let replayed = prop
        .check(&Config::default().with_replay(token))
        .expect("replay runs");
    assert_eq!(replayed.termination, TerminationReason::IsReplay);
    assert_eq!(replayed.counterexample.map(|c| c.value), Some(counterexample.value));
}

/// Property: searching on after the first counterexample never ends worse
pub fn test_deep_check_never_worse() {
    let prop = for_all(arbitrary_seed(), |&seed: &Seed| {
        let inner = Property::for_all(Gen::list_of(Gen::<u8>::int_range(0, 50), 0, 10), |xs: &Vec<u8>| {
            xs.iter().filter(|&&x| x > 20).count() < 2
        });

        let config = Config::default().with_seed(seed.0);
        let deep = inner.check(&config);
        let shallow = inner.check(&config.clone().without_deep_check());

        match (deep, shallow) {
            (Ok(deep), Ok(shallow)) => match (deep.counterexample, shallow.counterexample) {
                (Some(deep), Some(shallow)) => deep.distance <= shallow.distance,
                (None, None) => true,
                _ => false,
            },
            _ => false,
        }
    });

    assert_passes(prop, "Deep check never worse");
}

/// Property: a passing property runs exactly the configured iterations
pub fn test_iteration_budget() {
    let prop = Property::for_all2(
        arbitrary_seed(),
        Gen::<usize>::int_range(1, 60),
        |&seed, &iterations| {
            let inner = Property::for_all(Gen::<i64>::int_range(-10, 10), |&x| x.abs() <= 10);
            match inner.check(&Config::default().with_seed(seed.0).with_iterations(iterations)) {
                Ok(report) => {
                    report.passed
                        && report.iterations_completed == iterations
                        && report.termination == TerminationReason::ReachedMaximumIterations
                }
                Err(_) => false,
            }
        },
    );

    assert_passes(prop, "Iteration budget");
}

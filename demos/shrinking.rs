//! Shrink functions and the spaces they unfold into.

use lodestar_core::*;

fn main() {
    println!("Shrinking Demo");
    println!("==============");
    println!();

    println!("Integers approach their target by halving the difference:");
    for (value, target) in [(100, 0), (-37, 0), (10, 7)] {
        let candidates: Vec<i128> = shrink::towards(target)(&value).collect();
        println!("  towards({target}) of {value}: {candidates:?}");
    }
    println!();

    let list = vec![3, 1, 4, 1, 5, 9, 2, 6];
    println!("Structural list shrinks of {list:?}:");
    let halves: Vec<Vec<i32>> = shrink::bisect(0)(&list).collect();
    println!("  bisect: {halves:?}");
    let removals: Vec<Vec<i32>> = shrink::drop_one(0)(&list).take(4).collect();
    println!("  drop_one (first 4): {removals:?}");
    let sorted: Vec<Vec<i32>> = shrink::order(|x: &i32| *x)(&list).collect();
    println!("  order: {sorted:?}");
    let counted: Vec<Vec<i32>> = shrink::towards_count(2, |x: &i32| *x)(&list).take(5).collect();
    println!("  towards_count(2) (first 5): {counted:?}");
    println!();

    println!("Greedy search for the smallest value above 1000:");
    let space = ExampleSpace::unfold(
        9000_i128,
        shrink::towards(0),
        |v: &i128| *v as f64 / 90.0,
        |v: &i128| ExampleId::of(v),
    );
    let mut steps = 0;
    let mut smallest = None;
    for counterexample in space.counterexamples(|&v| v <= 1000) {
        steps += 1;
        smallest = Some(*counterexample.space.value());
    }
    match smallest {
        Some(value) => println!("  reached {value} after {steps} steps"),
        None => println!("  the root already passes"),
    }
    println!();

    println!("Minimal values straight from a generator:");
    let config = Config::default().with_seed(5);
    match Gen::<u32>::int_range(0, 10_000).minimal(|x| x * x > 5000, &config) {
        Ok(Some(value)) => println!("  smallest x with x * x > 5000: {value}"),
        Ok(None) => println!("  no value found"),
        Err(error) => println!("  {error}"),
    }
}

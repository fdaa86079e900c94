//! Basic example demonstrating Lodestar property-based testing.

use lodestar::*;

fn main() {
    println!("Lodestar Property-Based Testing Examples");
    println!();

    let config = Config::default().with_seed(42);

    // Example 1: Simple boolean property
    println!("Testing boolean property: a boolean converts to 0 or 1");
    let bool_prop = for_all(Gen::bool(), |&b| u8::from(b) <= 1).named("boolean as bit");
    match bool_prop.check(&config) {
        Ok(report) => println!("{report}"),
        Err(error) => println!("Check could not run: {error}"),
    }
    println!();

    // Example 2: Property that should fail (to demonstrate shrinking)
    println!("Testing property that should fail: all integers are below 50");
    let small_prop = for_all(Gen::<i32>::int_range(0, 100), |&x| x < 50).named("below fifty");
    match small_prop.check(&config) {
        Ok(report) => {
            println!("{report}");
            println!("  Terminated because the search {}", report.termination);
        }
        Err(error) => println!("Check could not run: {error}"),
    }
    println!();

    // Example 3: Lists shrink structurally, then element by element
    println!("Testing list property: sums stay below 30");
    let list_prop = for_all(Gen::list_of(Gen::<i32>::int_range(0, 10), 0, 20), |xs: &Vec<i32>| {
        xs.iter().sum::<i32>() < 30
    })
    .named("small sums");
    match list_prop.check(&config) {
        Ok(report) => println!("{report}"),
        Err(error) => println!("Check could not run: {error}"),
    }
    println!();

    // Example 4: Panics and errors carry their message
    println!("Testing a predicate that panics");
    let panic_prop = Property::for_all2(Gen::<u8>::int_range(0, 20), Gen::<u8>::int_range(1, 20), |&a, &b| {
        assert!(a / b < 5, "{a} / {b} is too large");
    })
    .named("bounded quotient");
    match panic_prop.check(&config) {
        Ok(report) => println!("{report}"),
        Err(error) => println!("Check could not run: {error}"),
    }
    println!();

    // Example 5: Preconditions discard inputs
    println!("Testing with a precondition: odd numbers stay odd when doubled plus one");
    let odd_prop = for_all(Gen::<i64>::int_range(-1000, 1000), |&x| (2 * x + 1) % 2 != 0)
        .precondition(|x| x % 2 != 0)
        .named("odd doubling");
    match odd_prop.check(&config) {
        Ok(report) => println!("{report}"),
        Err(error) => println!("Check could not run: {error}"),
    }
}

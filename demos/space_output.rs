//! Rendering example spaces.

use lodestar_core::*;

fn main() {
    println!("Example Space Rendering Demo");
    println!("============================");
    println!();

    println!("1. Integer generator (range 0-20)");
    let params = GenParameters::new(Seed::from_u64(42), Size::new(60));
    match Gen::<i32>::int_range(0, 20).first_space(params) {
        Ok(space) => {
            println!("Generated: {}", space.value());
            println!();
            println!("Space to depth 2:");
            print!("{}", space.render(2));
            println!("Compact: {}", space.render_compact(2));
            println!("Shrinks: {}", space.render_shrinks());
            println!("Numbered:");
            print!("{}", space.render_numbered());
        }
        Err(error) => println!("{error}"),
    }
    println!();

    println!("2. Mapped generator");
    let letters = Gen::<u8>::int_range(0, 25).map(|n| char::from(b'a' + n));
    match letters.first_space(params) {
        Ok(space) => {
            println!("Compact: {}", space.render_compact(3));
            println!("Shrinks: {}", space.render_shrinks());
        }
        Err(error) => println!("{error}"),
    }
    println!();

    println!("3. Hand-built space");
    let space = ExampleSpace::with_children(
        Example::new(ExampleId::of(&"root"), "root".to_string(), 2.0),
        vec![
            ExampleSpace::singleton("left".to_string()),
            ExampleSpace::singleton("right".to_string()),
        ],
    );
    print!("{}", space.render(3));
}

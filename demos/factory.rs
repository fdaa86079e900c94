//! Building generators from a factory of registered strategies.

use lodestar::*;

#[derive(Debug, Clone)]
struct Order {
    quantity: u32,
    discount: i8,
    lines: Vec<u32>,
}

#[derive(Debug, Clone)]
struct Category {
    children: Vec<Category>,
}

fn main() {
    println!("Generator Factory Demo");
    println!("======================");
    println!();

    let factory = GenFactory::new()
        .register(Gen::<u32>::int_range(1, 100))
        .register(Gen::<i8>::int_range(-20, 0))
        .register_list::<u32>(1, 5)
        .register_constructor(|factory: &GenFactory, context: &FactoryContext| {
            let quantity = factory.resolve::<u32>(context, "quantity")?;
            let discount = factory.resolve::<i8>(context, "discount")?;
            let lines = factory.resolve::<Vec<u32>>(context, "lines")?;
            Ok(Gen::tuple_of3(quantity, discount, lines).map(|(quantity, discount, lines)| Order {
                quantity: *quantity,
                discount: *discount,
                lines: lines.clone(),
            }))
        });

    println!("Sample orders:");
    match factory.create::<Order>().and_then(|orders| orders.sample(5, 11)) {
        Ok(orders) => orders.iter().for_each(|order| println!("  {order:?}")),
        Err(error) => println!("  {error}"),
    }
    println!();

    match factory.create::<Order>() {
        Ok(orders) => {
            let property = for_all(orders, |order: &Order| {
                let total: u32 = order.lines.iter().sum();
                total * order.quantity < 20_000
            })
            .named("order totals are bounded");
            match property.check(&Config::default().with_seed(3)) {
                Ok(report) => println!("{report}"),
                Err(error) => println!("Check could not run: {error}"),
            }
        }
        Err(error) => println!("{error}"),
    }
    println!();

    println!("Self-referential types are reported, not recursed into:");
    let recursive = GenFactory::new()
        .register_list::<Category>(0, 3)
        .register_constructor(|factory: &GenFactory, context: &FactoryContext| {
            let children = factory.resolve::<Vec<Category>>(context, "children")?;
            Ok(children.map(|children| Category {
                children: children.clone(),
            }))
        });
    match recursive.create::<Category>() {
        Ok(_) => println!("  unexpectedly built a generator"),
        Err(error) => println!("  {error}"),
    }
}

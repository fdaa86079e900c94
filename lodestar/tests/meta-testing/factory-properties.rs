//! Generator factory properties

use crate::{arbitrary_params, assert_passes};
use lodestar::*;

#[derive(Debug, Clone, PartialEq)]
struct Account {
    id: u32,
    balance: i64,
    tags: Vec<u8>,
}

fn account_factory() -> GenFactory {
    GenFactory::new()
        .register(Gen::<u32>::int_range(1, 9999))
        .register(Gen::<i64>::int_range(-500, 500))
        .register(Gen::<u8>::int_range(0, 3))
        .register_list::<u8>(0, 4)
        .register_constructor(|factory: &GenFactory, context: &FactoryContext| {
            let id = factory.resolve::<u32>(context, "id")?;
            let balance = factory.resolve::<i64>(context, "balance")?;
            let tags = factory.resolve::<Vec<u8>>(context, "tags")?;
            Ok(Gen::tuple_of3(id, balance, tags).map(|(id, balance, tags)| Account {
                id: *id,
                balance: *balance,
                tags: tags.clone(),
            }))
        })
}

/// Property: constructed values only use the registered member generators
pub fn test_factory_respects_registrations() {
    let Ok(accounts) = account_factory().create::<Account>() else {
        panic!("Account generator should resolve");
    };

    let prop = for_all(arbitrary_params(), move |&params: &GenParameters| {
        match accounts.first_space(params) {
            Ok(space) => space.traverse().take(100).all(|account| {
                (1..=9999).contains(&account.id)
                    && (-500..=500).contains(&account.balance)
                    && account.tags.len() <= 4
                    && account.tags.iter().all(|&t| t <= 3)
            }),
            Err(_) => false,
        }
    });

    assert_passes(prop, "Factory respects registrations");
}

/// Missing member generators are reported with the full member path.
pub fn test_missing_member_paths() {
    let factory = GenFactory::new()
        .register(Gen::<u32>::int_range(1, 9999))
        .register_constructor(|factory: &GenFactory, context: &FactoryContext| {
            let id = factory.resolve::<u32>(context, "id")?;
            let balance = factory.resolve::<i64>(context, "balance")?;
            Ok(id.zip(balance).map(|&(id, balance)| Account {
                id,
                balance,
                tags: Vec::new(),
            }))
        });

    match factory.create::<Account>() {
        Err(LodestarError::NoGenerator { type_name, path }) => {
            assert_eq!(type_name, "i64");
            assert_eq!(path, "Account.balance");
        }
        Err(other) => panic!("Expected a missing generator, got: {other}"),
        Ok(_) => panic!("Expected a missing generator, got a generator"),
    }
}

//! Replaying a failure from its token.

use lodestar::*;

fn main() {
    println!("Replay Tokens Demo");
    println!("==================");
    println!();

    let property = for_all(Gen::list_of(Gen::<u16>::int_range(0, 500), 0, 10), |xs: &Vec<u16>| {
        xs.windows(2).all(|pair| pair[0] <= pair[1])
    })
    .named("lists are sorted");

    let report = match property.check(&Config::default().with_seed(7)) {
        Ok(report) => report,
        Err(error) => {
            println!("Check could not run: {error}");
            return;
        }
    };
    println!("{report}");

    let Some(token) = report.replay_token.clone() else {
        println!("No failure to replay");
        return;
    };
    println!();

    match ReplayToken::decode(&token) {
        Ok(decoded) => println!(
            "Token points at size {} and path {:?}",
            decoded.size, decoded.path
        ),
        Err(error) => println!("Could not decode token: {error}"),
    }

    println!("Replaying...");
    match property.check(&Config::default().with_replay(token)) {
        Ok(replayed) => {
            println!("{replayed}");
            println!("  Terminated because the search {}", replayed.termination);
        }
        Err(error) => println!("Replay failed: {error}"),
    }
    println!();

    println!("Replaying against a different generator...");
    let changed = for_all(Gen::<u16>::int_range(0, 5), |&x| x < 3);
    let token = report.replay_token.unwrap_or_default();
    match changed.check(&Config::default().with_replay(token)) {
        Ok(replayed) => println!("{replayed}"),
        Err(error) => println!("Replay rejected: {error}"),
    }
}

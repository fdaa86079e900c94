//! Replay token properties
//!
//! Tokens must survive encoding, reject garbage without panicking, and lead
//! a replayed run back to the same counterexample.

use crate::{arbitrary_params, arbitrary_seed, assert_passes};
use lodestar::*;

/// Property: any parameters and path survive an encode/decode trip
pub fn test_token_round_trip() {
    let prop = Property::for_all2(
        arbitrary_params(),
        Gen::list_of(Gen::<usize>::int_range(0, 40), 0, 12),
        |&params, path| {
            let token = ReplayToken::new(params, path.clone());
            match token.encode().and_then(|encoded| ReplayToken::decode(&encoded)) {
                Ok(decoded) => decoded == token && decoded.params() == params,
                Err(_) => false,
            }
        },
    );

    assert_passes(prop, "Token round trip");
}

/// Property: decoding arbitrary text returns a result instead of panicking
pub fn test_decode_never_panics() {
    let alphabet: Vec<char> = "abcXYZ019-_=+/!{}\"".chars().collect();
    let text = Gen::list_of(Gen::element(alphabet), 0, 40).map(|chars| chars.iter().collect::<String>());

    let prop = for_all(text, |input: &String| {
        match ReplayToken::decode(input) {
            Ok(token) => token.version == 1 && token.size <= 100,
            Err(LodestarError::MalformedReplay { .. }) => true,
            Err(_) => false,
        }
    });

    assert_passes(prop, "Decode never panics");
}

/// Property: replaying a failure reproduces its counterexample
pub fn test_replay_reproduces_failures() {
    let prop = for_all(arbitrary_seed(), |&seed: &Seed| {
        let inner = Property::for_all2(
            Gen::<i32>::int_range(0, 1000),
            Gen::list_of(Gen::bool(), 0, 8),
            |&n, flags| n < 300 || flags.iter().all(|&f| !f),
        );

        let Ok(report) = inner.check(&Config::default().with_seed(seed.0)) else {
            return false;
        };
        let (Some(original), Some(token)) = (report.counterexample, report.replay_token) else {
            return report.passed;
        };

        match inner.check(&Config::default().with_replay(token)) {
            Ok(replayed) => {
                !replayed.passed
                    && replayed.termination == TerminationReason::IsReplay
                    && replayed.counterexample.map(|c| c.value) == Some(original.value)
            }
            Err(_) => false,
        }
    });

    assert_passes(prop, "Replay reproduces failures");
}

//! The check loop: run a property, find counterexamples and shrink them.
//!
//! The loop is a state machine. Every transition consumes the current state
//! and the accumulated [`CheckStateData`] and returns the next pair, until a
//! [`CheckState::Terminal`] state is reached.

use crate::data::{Config, GenParameters, ResizeStrategy, Seed};
use crate::error::{LodestarError, Result};
use crate::gen::{Gen, GenIteration, Iterations};
use crate::property::{Property, Test, TestOutcome};
use crate::replay::ReplayToken;
use crate::space::{self, panic_message, Counterexamples, ExampleId, ExampleSpace};
use std::any::Any;
use std::collections::VecDeque;
use std::fmt::{self, Debug};
use std::iter;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, debug_span, trace};

/// Why a check run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    IsReplay,
    DeepCheckDisabled,
    ReachedMaximumIterations,
    ReachedShrinkLimit,
    ReachedMaximumSize,
    /// The best counterexample has distance 0.
    FoundTheoreticalSmallestCounterexample,
    /// The most recent counterexamples all share one identity.
    FoundPragmaticSmallestCounterexample,
    FoundError,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            TerminationReason::IsReplay => "replayed a recorded example",
            TerminationReason::DeepCheckDisabled => "stopped at the first counterexample",
            TerminationReason::ReachedMaximumIterations => "reached the iteration budget",
            TerminationReason::ReachedShrinkLimit => "reached the shrink limit",
            TerminationReason::ReachedMaximumSize => "reached the maximum size",
            TerminationReason::FoundTheoreticalSmallestCounterexample => {
                "found the smallest possible counterexample"
            }
            TerminationReason::FoundPragmaticSmallestCounterexample => {
                "counterexamples stopped getting smaller"
            }
            TerminationReason::FoundError => "the generator failed",
        };
        write!(f, "{description}")
    }
}

/// The minimal failing input of a run.
#[derive(Debug, Clone)]
pub struct ReportedCounterexample<T> {
    pub value: T,
    /// The inputs formatted for display.
    pub presented: Vec<String>,
    /// Subspace indices from the root of the generated space.
    pub path: Vec<usize>,
    pub exception: Option<String>,
    pub distance: f64,
    pub id: ExampleId,
    /// Parameters of the iteration the counterexample was found in.
    pub replay: GenParameters,
}

impl<T> ReportedCounterexample<T> {
    /// Lower distance wins; on a tie the one found at a larger size wins.
    fn is_better_than(&self, other: &Self) -> bool {
        self.distance < other.distance
            || (self.distance == other.distance && self.replay.size > other.replay.size)
    }
}

/// Outcome of a check run.
#[derive(Debug, Clone)]
pub struct CheckReport<T> {
    pub name: Option<String>,
    pub passed: bool,
    pub counterexample: Option<ReportedCounterexample<T>>,
    /// Reproduces the counterexample or generation error with
    /// [`Config::with_replay`].
    pub replay_token: Option<String>,
    pub iterations_completed: usize,
    pub discards: usize,
    pub shrinks: usize,
    pub termination: TerminationReason,
    pub generation_error: Option<LodestarError>,
}

impl<T> fmt::Display for CheckReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("property");

        if let Some(error) = &self.generation_error {
            writeln!(f, "  ⚐ {name} gave up after {} tests: {error}", self.iterations_completed)?;
        } else if let Some(counterexample) = &self.counterexample {
            writeln!(
                f,
                "  ✗ {name} failed after {} tests and {} shrinks.",
                self.iterations_completed, self.shrinks
            )?;
            writeln!(f)?;
            writeln!(f, "    Minimal counterexample: {}", counterexample.presented.join(", "))?;
            if let Some(exception) = &counterexample.exception {
                writeln!(f, "    Exception: {exception}")?;
            }
        } else {
            write!(f, "  ✓ {name} passed {} tests.", self.iterations_completed)?;
            if self.discards > 0 {
                write!(f, " ({} discarded)", self.discards)?;
            }
            return Ok(());
        }

        match &self.replay_token {
            Some(token) => write!(f, "    Replay: {token}"),
            None => Ok(()),
        }
    }
}

/// Accumulated search state, threaded through every transition.
struct CheckStateData<T> {
    requested_iterations: usize,
    iterations_before_counterexample: usize,
    iterations_after_counterexample: usize,
    discards: usize,
    consecutive_discards: usize,
    discard_ceiling: usize,
    shrinks: usize,
    shrink_limit: usize,
    best: Option<ReportedCounterexample<T>>,
    recent: VecDeque<ExampleId>,
    plateau_window: usize,
    next_params: GenParameters,
    resize: ResizeStrategy,
    deep_check: bool,
    is_replay: bool,
    generation_error: Option<(LodestarError, GenParameters)>,
}

impl<T> CheckStateData<T> {
    fn new(config: &Config, params: GenParameters) -> Self {
        CheckStateData {
            requested_iterations: config.iterations,
            iterations_before_counterexample: 0,
            iterations_after_counterexample: 0,
            discards: 0,
            consecutive_discards: 0,
            discard_ceiling: config.discard_ceiling,
            shrinks: 0,
            shrink_limit: config.shrink_limit,
            best: None,
            recent: VecDeque::with_capacity(config.plateau_window),
            plateau_window: config.plateau_window,
            next_params: params,
            resize: config.resize,
            deep_check: config.deep_check,
            is_replay: config.replay.is_some(),
            generation_error: None,
        }
    }

    fn completed_iterations(&self) -> usize {
        self.iterations_before_counterexample + self.iterations_after_counterexample
    }

    fn with_discard(self, next: GenParameters) -> Self {
        CheckStateData {
            discards: self.discards + 1,
            consecutive_discards: self.consecutive_discards + 1,
            next_params: next,
            ..self
        }
    }

    fn with_instance(self) -> Self {
        CheckStateData {
            consecutive_discards: 0,
            ..self
        }
    }

    fn with_shrink(self) -> Self {
        CheckStateData {
            shrinks: self.shrinks + 1,
            ..self
        }
    }

    fn with_completed_iteration(self) -> Self {
        if self.best.is_none() {
            CheckStateData {
                iterations_before_counterexample: self.iterations_before_counterexample + 1,
                ..self
            }
        } else {
            CheckStateData {
                iterations_after_counterexample: self.iterations_after_counterexample + 1,
                ..self
            }
        }
    }

    fn with_counterexample(mut self, counterexample: ReportedCounterexample<T>) -> Self {
        if self.recent.len() == self.plateau_window {
            self.recent.pop_front();
        }
        self.recent.push_back(counterexample.id);

        let best = match self.best {
            Some(best) if !counterexample.is_better_than(&best) => best,
            _ => counterexample,
        };
        CheckStateData {
            best: Some(best),
            ..self
        }
    }

    fn with_next_params(self, next_params: GenParameters) -> Self {
        CheckStateData { next_params, ..self }
    }

    fn with_generation_error(self, error: LodestarError, replay: GenParameters) -> Self {
        CheckStateData {
            generation_error: Some((error, replay)),
            ..self
        }
    }

    fn has_plateaued(&self) -> bool {
        self.recent.len() == self.plateau_window
            && self.recent.iter().all(|id| Some(id) == self.recent.front())
    }

    fn into_report(self, name: Option<String>, termination: TerminationReason) -> CheckReport<T> {
        let iterations_completed = self.completed_iterations();
        let (generation_error, replay_token) = match self.generation_error {
            Some((error, replay)) => (Some(error), ReplayToken::new(replay, Vec::new()).encode().ok()),
            None => {
                let token = self
                    .best
                    .as_ref()
                    .and_then(|best| ReplayToken::new(best.replay, best.path.clone()).encode().ok());
                (None, token)
            }
        };

        CheckReport {
            name,
            passed: self.best.is_none() && generation_error.is_none(),
            counterexample: self.best,
            replay_token,
            iterations_completed,
            discards: self.discards,
            shrinks: self.shrinks,
            termination,
            generation_error,
        }
    }
}

/// States of the check loop.
enum CheckState<T> {
    Initial,
    BeginGeneration,
    HoldingIterations(Iterations<Test<T>>),
    Instance {
        space: ExampleSpace<Test<T>>,
        replay: GenParameters,
        next: GenParameters,
    },
    Discard(Iterations<Test<T>>),
    GenerationError {
        generator: String,
        message: String,
        replay: GenParameters,
    },
    BeginTestExploration {
        space: ExampleSpace<Test<T>>,
        replay: GenParameters,
        next: GenParameters,
    },
    HoldingTestExploration(Exploration<T>),
    Counterexample(Exploration<T>, space::Counterexample<Test<T>>),
    NonCounterexample {
        replay: GenParameters,
        next: GenParameters,
    },
    EndTestExploration {
        replay: GenParameters,
        next: GenParameters,
        found: Option<ReportedCounterexample<T>>,
    },
    EndGeneration {
        replay: GenParameters,
        next: GenParameters,
        found: Option<ReportedCounterexample<T>>,
    },
    Terminal(TerminationReason),
}

/// An in-progress walk over the counterexamples of one instance.
struct Exploration<T> {
    counterexamples: Counterexamples<Test<T>>,
    walked: usize,
    replay: GenParameters,
    next: GenParameters,
    found: Option<ReportedCounterexample<T>>,
}

struct Context<T> {
    gen: Gen<Test<T>>,
    replay: Option<String>,
}

type Transition<T> = Result<(CheckState<T>, CheckStateData<T>)>;

impl<T: Clone + 'static> CheckState<T> {
    fn step(self, data: CheckStateData<T>, context: &Context<T>) -> Transition<T> {
        match self {
            CheckState::Initial => match &context.replay {
                Some(token) => replay(token, data, context),
                None => Ok((CheckState::BeginGeneration, data)),
            },

            CheckState::BeginGeneration => {
                if data.completed_iterations() >= data.requested_iterations {
                    return Ok((CheckState::Terminal(TerminationReason::ReachedMaximumIterations), data));
                }
                let iterations = guarded(&context.gen, data.next_params);
                Ok((CheckState::HoldingIterations(iterations), data))
            }

            CheckState::HoldingIterations(mut iterations) => match iterations.next() {
                Some(GenIteration::Instance {
                    space,
                    replay,
                    next,
                }) => Ok((
                    CheckState::Instance {
                        space,
                        replay,
                        next,
                    },
                    data.with_instance(),
                )),
                Some(GenIteration::Discard { next, .. }) => {
                    Ok((CheckState::Discard(iterations), data.with_discard(next)))
                }
                Some(GenIteration::Error {
                    generator,
                    message,
                    replay,
                }) => Ok((
                    CheckState::GenerationError {
                        generator,
                        message,
                        replay,
                    },
                    data,
                )),
                None => {
                    let replay = data.next_params;
                    Ok((
                        CheckState::GenerationError {
                            generator: "property".to_string(),
                            message: "generator produced no iterations".to_string(),
                            replay,
                        },
                        data,
                    ))
                }
            },

            CheckState::Discard(iterations) => {
                trace!(
                    discards = data.discards,
                    consecutive = data.consecutive_discards,
                    "discarded"
                );
                if data.consecutive_discards > data.discard_ceiling {
                    return Err(LodestarError::Exhausted {
                        discards: data.consecutive_discards,
                        ceiling: data.discard_ceiling,
                    });
                }
                Ok((CheckState::HoldingIterations(iterations), data))
            }

            CheckState::GenerationError {
                generator,
                message,
                replay,
            } => {
                debug!(%generator, %message, params = %replay, "generation error");
                let error = LodestarError::GenerationFailed { generator, message };
                Ok((
                    CheckState::Terminal(TerminationReason::FoundError),
                    data.with_generation_error(error, replay),
                ))
            }

            CheckState::Instance {
                space,
                replay,
                next,
            } => Ok((
                CheckState::BeginTestExploration {
                    space,
                    replay,
                    next,
                },
                data,
            )),

            CheckState::BeginTestExploration {
                space,
                replay,
                next,
            } => {
                let exploration = Exploration {
                    counterexamples: space.counterexamples(|test: &Test<T>| !test.outcome().is_failure()),
                    walked: 0,
                    replay,
                    next,
                    found: None,
                };
                Ok((CheckState::HoldingTestExploration(exploration), data))
            }

            CheckState::HoldingTestExploration(mut exploration) => {
                let exhausted = exploration.walked > 0 && data.shrinks >= data.shrink_limit;
                let candidate = if exhausted {
                    None
                } else {
                    exploration.counterexamples.next()
                };

                match candidate {
                    Some(counterexample) => {
                        Ok((CheckState::Counterexample(exploration, counterexample), data))
                    }
                    None if exploration.found.is_some() => Ok((
                        CheckState::EndTestExploration {
                            replay: exploration.replay,
                            next: exploration.next,
                            found: exploration.found,
                        },
                        data,
                    )),
                    None => Ok((
                        CheckState::NonCounterexample {
                            replay: exploration.replay,
                            next: exploration.next,
                        },
                        data,
                    )),
                }
            }

            CheckState::Counterexample(mut exploration, counterexample) => {
                let data = if exploration.walked > 0 {
                    trace!(path = ?counterexample.path, distance = counterexample.space.current.distance, "shrink");
                    data.with_shrink()
                } else {
                    data
                };
                exploration.walked += 1;
                exploration.found = Some(reported(counterexample, exploration.replay));
                Ok((CheckState::HoldingTestExploration(exploration), data))
            }

            CheckState::NonCounterexample { replay, next } => Ok((
                CheckState::EndTestExploration {
                    replay,
                    next,
                    found: None,
                },
                data,
            )),

            CheckState::EndTestExploration {
                replay,
                next,
                found,
            } => Ok((
                CheckState::EndGeneration {
                    replay,
                    next,
                    found,
                },
                data,
            )),

            CheckState::EndGeneration {
                replay,
                next,
                found,
            } => {
                let data = match found {
                    Some(counterexample) => {
                        debug!(
                            distance = counterexample.distance,
                            path = ?counterexample.path,
                            size = replay.size.get(),
                            "counterexample"
                        );
                        data.with_counterexample(counterexample)
                    }
                    None => data,
                };
                let data = data.with_completed_iteration();

                if let Some(best) = &data.best {
                    let reason = if data.is_replay {
                        Some(TerminationReason::IsReplay)
                    } else if !data.deep_check {
                        Some(TerminationReason::DeepCheckDisabled)
                    } else if data.completed_iterations() >= data.requested_iterations {
                        Some(TerminationReason::ReachedMaximumIterations)
                    } else if data.shrinks >= data.shrink_limit {
                        Some(TerminationReason::ReachedShrinkLimit)
                    } else if replay.size.is_max() {
                        Some(TerminationReason::ReachedMaximumSize)
                    } else if best.distance == 0.0 {
                        Some(TerminationReason::FoundTheoreticalSmallestCounterexample)
                    } else if data.has_plateaued() {
                        Some(TerminationReason::FoundPragmaticSmallestCounterexample)
                    } else {
                        None
                    };

                    if let Some(reason) = reason {
                        return Ok((CheckState::Terminal(reason), data));
                    }
                }

                let size = data.resize.resize(
                    next.size,
                    data.completed_iterations(),
                    data.requested_iterations,
                    data.best.is_some(),
                );
                Ok((CheckState::BeginGeneration, data.with_next_params(next.with_size(size))))
            }

            terminal @ CheckState::Terminal(_) => Ok((terminal, data)),
        }
    }
}

fn reported<T: Clone + 'static>(
    counterexample: space::Counterexample<Test<T>>,
    replay: GenParameters,
) -> ReportedCounterexample<T> {
    let test = counterexample.space.value();
    let exception = counterexample.exception.or_else(|| match test.outcome() {
        TestOutcome::Failed { exception } => exception.clone(),
        _ => None,
    });

    ReportedCounterexample {
        value: test.input().clone(),
        presented: test.present(),
        path: counterexample.path,
        exception,
        distance: counterexample.space.current.distance,
        id: counterexample.space.current.id,
        replay,
    }
}

/// Run `gen` so that a panic inside one of its closures surfaces as an
/// [`GenIteration::Error`] for the attempt that panicked, ending the stream.
fn guarded<T: 'static>(gen: &Gen<T>, params: GenParameters) -> Iterations<T> {
    match catch_unwind(AssertUnwindSafe(|| gen.run(params))) {
        Ok(iterations) => Box::new(Guarded {
            iterations: Some(iterations),
            params,
        }),
        Err(payload) => Box::new(iter::once(panicked(payload, params))),
    }
}

struct Guarded<T> {
    iterations: Option<Iterations<T>>,
    params: GenParameters,
}

impl<T> Iterator for Guarded<T> {
    type Item = GenIteration<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let iterations = self.iterations.as_mut()?;
        match catch_unwind(AssertUnwindSafe(|| iterations.next())) {
            Ok(iteration) => {
                if let Some(next) = iteration.as_ref().and_then(GenIteration::next_params) {
                    self.params = next;
                }
                iteration
            }
            Err(payload) => {
                self.iterations = None;
                Some(panicked(payload, self.params))
            }
        }
    }
}

fn panicked<T>(payload: Box<dyn Any + Send>, replay: GenParameters) -> GenIteration<T> {
    GenIteration::Error {
        generator: "closure".to_string(),
        message: format!("panicked: {}", panic_message(payload.as_ref())),
        replay,
    }
}

/// Regenerate the recorded iteration and navigate straight to the node.
fn replay<T: Clone + 'static>(token: &str, data: CheckStateData<T>, context: &Context<T>) -> Transition<T> {
    let decoded = ReplayToken::decode(token)?;
    let params = decoded.params();
    let invalidated = || LodestarError::ReplayInvalidated {
        token: token.to_string(),
    };

    let space = match guarded(&context.gen, params).next() {
        Some(GenIteration::Instance { space, .. }) => space,
        Some(GenIteration::Error {
            generator,
            message,
            replay,
        }) => {
            debug!(%generator, %message, params = %replay, "replayed generation error");
            let error = LodestarError::GenerationFailed { generator, message };
            return Ok((
                CheckState::Terminal(TerminationReason::FoundError),
                data.with_generation_error(error, replay),
            ));
        }
        Some(GenIteration::Discard { .. }) | None => return Err(invalidated()),
    };
    let node = space.navigate(&decoded.path).ok_or_else(invalidated)?;
    debug!(params = %params, path = ?decoded.path, "replaying");

    let test = node.value();
    let data = match test.outcome() {
        TestOutcome::Failed { exception } => {
            let counterexample = ReportedCounterexample {
                value: test.input().clone(),
                presented: test.present(),
                path: decoded.path.clone(),
                exception: exception.clone(),
                distance: node.current.distance,
                id: node.current.id,
                replay: params,
            };
            data.with_counterexample(counterexample)
        }
        _ => data,
    };

    Ok((
        CheckState::Terminal(TerminationReason::IsReplay),
        data.with_completed_iteration(),
    ))
}

/// Run a property against its generator until a termination condition is
/// met.
///
/// Counterexamples and generator failures are reported in the returned
/// [`CheckReport`]. `Err` is reserved for invalid configuration, discard
/// exhaustion and replay tokens that cannot be used.
pub fn check<T>(property: &Property<T>, config: &Config) -> Result<CheckReport<T>>
where
    T: Clone + Debug + 'static,
{
    config.validate()?;

    let span = debug_span!("check", property = property.name().unwrap_or("property"));
    let _guard = span.enter();

    let seed = config.seed.map(Seed::from_u64).unwrap_or_else(Seed::random);
    let context = Context {
        gen: property.to_gen(),
        replay: config.replay.clone(),
    };

    let mut data = CheckStateData::new(config, GenParameters::new(seed, config.size));
    let mut state = CheckState::Initial;
    let termination = loop {
        if let CheckState::Terminal(reason) = state {
            break reason;
        }
        (state, data) = state.step(data, &context)?;
    };

    debug!(
        %termination,
        iterations = data.completed_iterations(),
        shrinks = data.shrinks,
        discards = data.discards,
        "check finished"
    );
    Ok(data.into_report(property.name().map(str::to_string), termination))
}

impl<T: Clone + Debug + 'static> Gen<T> {
    /// Search for the simplest generated value satisfying `pred`.
    pub fn minimal<P>(&self, pred: P, config: &Config) -> Result<Option<T>>
    where
        P: Fn(&T) -> bool + 'static,
    {
        let property = Property::for_all(self.clone(), move |value: &T| !pred(value));
        let report = check(&property, config)?;
        Ok(report.counterexample.map(|counterexample| counterexample.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Size;

    fn config() -> Config {
        Config::default().with_seed(1234)
    }

    #[test]
    fn test_integer_scenario() {
        let property = Property::for_all(Gen::int_range(0, 100), |&x| x < 50);
        let report = check(&property, &config()).expect("report");

        assert!(!report.passed);
        assert!(report.shrinks > 0);
        let counterexample = report.counterexample.expect("counterexample");
        assert_eq!(counterexample.value, 50);
        assert!(matches!(
            report.termination,
            TerminationReason::FoundPragmaticSmallestCounterexample | TerminationReason::ReachedMaximumSize
        ));
    }

    #[test]
    fn test_passing_property_runs_all_iterations() {
        let property = Property::for_all(Gen::int_range(0, 100), |&x| x <= 100);
        let report = check(&property, &config().with_iterations(37)).expect("report");

        assert!(report.passed);
        assert_eq!(report.iterations_completed, 37);
        assert_eq!(report.termination, TerminationReason::ReachedMaximumIterations);
        assert!(report.replay_token.is_none());
    }

    #[test]
    fn test_deep_check_disabled_stops_early() {
        let property = Property::for_all(Gen::int_range(0, 100), |&x| x < 50);
        let report = check(&property, &config().without_deep_check()).expect("report");

        assert_eq!(report.termination, TerminationReason::DeepCheckDisabled);
        assert_eq!(report.counterexample.expect("counterexample").value, 50);
    }

    #[test]
    fn test_shrink_limit() {
        let property = Property::for_all(Gen::int_range(0, 1_000_000), |&x| x < 10);
        let report = check(&property, &config().with_shrinks(2).with_size(Size::MAX)).expect("report");

        assert_eq!(report.shrinks, 2);
        assert_eq!(report.termination, TerminationReason::ReachedShrinkLimit);
    }

    #[test]
    fn test_fixed_max_size_terminates() {
        let property = Property::for_all(Gen::int_range(0, 100), |&x| x < 50);
        let config = config()
            .with_size(Size::MAX)
            .with_resize(crate::data::ResizeStrategy::Fixed);
        let report = check(&property, &config).expect("report");

        assert_eq!(report.termination, TerminationReason::ReachedMaximumSize);
        assert_eq!(report.counterexample.expect("counterexample").value, 50);
    }

    #[test]
    fn test_generation_error_is_reported() {
        let property = Property::for_all(Gen::int_range(10, 5), |_| true);
        let report = check(&property, &config()).expect("report");

        assert!(!report.passed);
        assert_eq!(report.termination, TerminationReason::FoundError);
        assert!(matches!(
            report.generation_error,
            Some(LodestarError::GenerationFailed { .. })
        ));
        assert!(report.replay_token.is_some());
    }

    #[test]
    fn test_replay_reproduces_generation_error() {
        let property = Property::for_all(Gen::int_range(10, 5), |_| true);
        let report = check(&property, &config()).expect("report");
        let token = report.replay_token.expect("token");

        let replayed = check(&property, &Config::default().with_replay(token)).expect("replay");
        assert!(!replayed.passed);
        assert_eq!(replayed.termination, TerminationReason::FoundError);
        assert_eq!(replayed.generation_error, report.generation_error);
    }

    #[test]
    fn test_generator_panic_is_a_generation_error() {
        let property = Property::for_all(
            Gen::<i32>::int_range(0, 10).map(|_| -> i32 { panic!("gen boom") }),
            |_| true,
        );
        let report = check(&property, &config()).expect("report");

        assert!(!report.passed);
        assert_eq!(report.termination, TerminationReason::FoundError);
        match &report.generation_error {
            Some(LodestarError::GenerationFailed { message, .. }) => assert!(message.contains("gen boom")),
            other => panic!("Expected a generation error, got: {other:?}"),
        }

        let token = report.replay_token.expect("token");
        let replayed = check(&property, &Config::default().with_replay(token)).expect("replay");
        assert_eq!(replayed.termination, TerminationReason::FoundError);
        assert_eq!(replayed.generation_error, report.generation_error);
    }

    #[test]
    fn test_panicking_simplifications_keep_counterexample() {
        let gen = Gen::from_fn(|params: GenParameters| GenIteration::Instance {
            space: ExampleSpace::new(
                crate::space::Example::new(ExampleId::of(&10), 10, 10.0),
                || -> crate::shrink::Shrinks<ExampleSpace<i32>> { panic!("cannot simplify") },
            ),
            replay: params,
            next: params,
        });
        let report = check(&Property::for_all(gen, |&x| x < 5), &config()).expect("report");

        assert!(!report.passed);
        assert_eq!(report.shrinks, 0);
        assert_eq!(report.counterexample.expect("counterexample").value, 10);
    }

    #[test]
    fn test_plateau_window_of_one() {
        let property = Property::for_all(Gen::int_range(0, 100), |&x| x < 50);
        let config = config()
            .with_size(Size::new(99))
            .with_resize(ResizeStrategy::Fixed)
            .with_plateau_window(1);
        let report = check(&property, &config).expect("report");

        assert_eq!(
            report.termination,
            TerminationReason::FoundPragmaticSmallestCounterexample
        );
        assert_eq!(report.counterexample.expect("counterexample").value, 50);
    }

    #[test]
    fn test_best_counterexample_ordering() {
        let at = |distance: f64, size: usize| ReportedCounterexample {
            value: 0,
            presented: vec!["0".to_string()],
            path: Vec::new(),
            exception: None,
            distance,
            id: ExampleId::of(&0),
            replay: GenParameters::new(Seed::from_u64(1), Size::new(size)),
        };

        assert!(at(1.0, 10).is_better_than(&at(2.0, 90)));
        assert!(!at(2.0, 90).is_better_than(&at(1.0, 10)));
        assert!(at(5.0, 60).is_better_than(&at(5.0, 40)));
        assert!(!at(5.0, 40).is_better_than(&at(5.0, 60)));
        assert!(!at(5.0, 40).is_better_than(&at(5.0, 40)));
    }

    #[test]
    fn test_discard_exhaustion() {
        let property = Property::for_all(Gen::int_range(0, 100), |_| true).precondition(|x| *x > 1000);
        let result = check(&property, &config().with_discard_ceiling(20));

        assert!(matches!(
            result,
            Err(LodestarError::Exhausted {
                discards: 21,
                ceiling: 20
            })
        ));
    }

    #[test]
    fn test_invalid_config() {
        let property = Property::for_all(Gen::bool(), |_| true);
        let result = check(&property, &config().with_plateau_window(0));
        assert!(matches!(result, Err(LodestarError::InvalidConfig { .. })));
    }

    #[test]
    fn test_replay_reproduces_counterexample() {
        let property = Property::for_all(Gen::list_of(Gen::int_range(0, 10), 0, 20), |xs| {
            xs.iter().sum::<i32>() < 30
        });
        let report = check(&property, &config()).expect("report");
        let original = report.counterexample.expect("counterexample");
        let token = report.replay_token.expect("token");

        let replayed = check(&property, &Config::default().with_replay(token)).expect("replay");
        assert_eq!(replayed.termination, TerminationReason::IsReplay);
        assert!(!replayed.passed);
        let counterexample = replayed.counterexample.expect("counterexample");
        assert_eq!(counterexample.value, original.value);
        assert_eq!(counterexample.path, original.path);
    }

    #[test]
    fn test_replay_invalidated() {
        let failing = Property::for_all(Gen::int_range(0, 100), |&x| x < 50);
        let token = check(&failing, &config())
            .expect("report")
            .replay_token
            .expect("token");

        let changed = Property::for_all(Gen::constant(0), |&x| x < 50);
        let result = check(&changed, &Config::default().with_replay(token));
        assert!(matches!(result, Err(LodestarError::ReplayInvalidated { .. })));

        let malformed = check(&failing, &Config::default().with_replay("???"));
        assert!(matches!(malformed, Err(LodestarError::MalformedReplay { .. })));
    }

    #[test]
    fn test_minimal() {
        let gen = Gen::int_range(0, 1000);
        let value = gen.minimal(|x| *x >= 137, &config()).expect("check");
        assert_eq!(value, Some(137));

        assert_eq!(Gen::int_range(0, 10).minimal(|x| *x > 10, &config()).expect("check"), None);
    }

    #[test]
    fn test_report_display() {
        let property = Property::for_all(Gen::int_range(0, 100), |&x| x < 50).named("small numbers");
        let report = check(&property, &config()).expect("report");
        let rendered = report.to_string();

        assert!(rendered.contains("✗ small numbers failed after"));
        assert!(rendered.contains("Minimal counterexample: 50"));
        assert!(rendered.contains("Replay: "));

        let passing = Property::for_all(Gen::bool(), |_| true);
        let rendered = check(&passing, &config()).expect("report").to_string();
        assert_eq!(rendered, "  ✓ property passed 100 tests.");
    }
}

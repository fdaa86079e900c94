//! Generator combinators for property-based testing.
//!
//! A generator is a replayable function from [`GenParameters`] to a lazy
//! stream of [`GenIteration`]s. Running it twice with the same parameters
//! produces the same stream.

use crate::data::{GenParameters, Seed, Size};
use crate::error::{LodestarError, Result};
use crate::space::{Example, ExampleSpace};
use std::iter;
use std::rc::Rc;
use tracing::trace;

pub mod primitives;

pub use primitives::Integral;

/// Consecutive filter rejections before the filter jumps to a bigger size.
pub const DEFAULT_DISCARD_BREAKER: usize = 5;

const SAMPLE_DISCARD_LIMIT: usize = 100;

/// One step of a generator run.
#[derive(Debug, Clone)]
pub enum GenIteration<T> {
    /// A generated example space. Running the generator from `replay`
    /// reproduces it as the first iteration.
    Instance {
        space: ExampleSpace<T>,
        replay: GenParameters,
        next: GenParameters,
    },
    /// The attempt was abandoned because a precondition failed.
    Discard {
        replay: GenParameters,
        next: GenParameters,
    },
    /// The generator cannot proceed with these parameters.
    Error {
        generator: String,
        message: String,
        replay: GenParameters,
    },
}

impl<T> GenIteration<T> {
    /// Parameters that reproduce this iteration.
    pub fn replay_params(&self) -> GenParameters {
        match self {
            GenIteration::Instance { replay, .. }
            | GenIteration::Discard { replay, .. }
            | GenIteration::Error { replay, .. } => *replay,
        }
    }

    /// Parameters for the following iteration; errors end the stream.
    pub fn next_params(&self) -> Option<GenParameters> {
        match self {
            GenIteration::Instance { next, .. } | GenIteration::Discard { next, .. } => Some(*next),
            GenIteration::Error { .. } => None,
        }
    }

    pub fn is_instance(&self) -> bool {
        matches!(self, GenIteration::Instance { .. })
    }

    /// Transform the space of an instance; discards and errors pass through.
    pub fn map_space<U, F>(self, f: F) -> GenIteration<U>
    where
        F: FnOnce(ExampleSpace<T>) -> ExampleSpace<U>,
    {
        match self {
            GenIteration::Instance {
                space,
                replay,
                next,
            } => GenIteration::Instance {
                space: f(space),
                replay,
                next,
            },
            GenIteration::Discard { replay, next } => GenIteration::Discard { replay, next },
            GenIteration::Error {
                generator,
                message,
                replay,
            } => GenIteration::Error {
                generator,
                message,
                replay,
            },
        }
    }
}

/// A lazy stream of generator iterations.
pub type Iterations<T> = Box<dyn Iterator<Item = GenIteration<T>>>;

/// A generator for test data of type `T`.
///
/// Generators are explicit, first-class values composed with combinators.
/// Cloning is cheap.
pub struct Gen<T> {
    generator: Rc<dyn Fn(GenParameters) -> Iterations<T>>,
}

impl<T> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Gen {
            generator: self.generator.clone(),
        }
    }
}

impl<T: 'static> Gen<T> {
    /// Create a generator from a stream function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(GenParameters) -> Iterations<T> + 'static,
    {
        Gen {
            generator: Rc::new(f),
        }
    }

    /// Lift a single-shot function into an infinite stream, feeding the
    /// `next` parameters of each iteration into the following one.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(GenParameters) -> GenIteration<T> + 'static,
    {
        let f = Rc::new(f);
        Gen::new(move |params| {
            let f = f.clone();
            let mut params = Some(params);
            Box::new(iter::from_fn(move || {
                let iteration = f(params.take()?);
                params = iteration.next_params();
                Some(iteration)
            }))
        })
    }

    /// Run the generator.
    pub fn run(&self, params: GenParameters) -> Iterations<T> {
        (self.generator)(params)
    }

    /// A generator that always fails.
    pub fn error(generator: impl Into<String>, message: impl Into<String>) -> Self {
        let (generator, message) = (generator.into(), message.into());
        Gen::from_fn(move |params| GenIteration::Error {
            generator: generator.clone(),
            message: message.clone(),
            replay: params,
        })
    }

    /// Map a function over the generated values.
    pub fn map<U, F>(self, f: F) -> Gen<U>
    where
        U: 'static,
        F: Fn(&T) -> U + 'static,
    {
        let f = Rc::new(f);
        Gen::new(move |params| {
            let f = f.clone();
            Box::new(self.run(params).map(move |iteration| {
                let f = f.clone();
                iteration.map_space(move |space| space.map(move |value| f(value)))
            }))
        })
    }

    /// Bind/flatmap for dependent generation.
    ///
    /// Shrinking explores simplifications of the upstream value (with the
    /// downstream regenerated from it) before simplifications of the
    /// downstream value.
    pub fn bind<U, F>(self, f: F) -> Gen<U>
    where
        T: Clone,
        U: Clone + 'static,
        F: Fn(&T) -> Gen<U> + 'static,
    {
        let f: Rc<dyn Fn(&T) -> Gen<U>> = Rc::new(f);
        Gen::new(move |params| {
            let f = f.clone();
            Box::new(self.run(params).map(move |iteration| match iteration {
                GenIteration::Instance {
                    space,
                    replay,
                    next,
                } => {
                    let downstream_params = GenParameters::new(downstream_seed(replay.seed), next.size);
                    match f(space.value()).run(downstream_params).next() {
                        Some(GenIteration::Instance {
                            space: downstream, ..
                        }) => GenIteration::Instance {
                            space: join(space, downstream, f.clone(), downstream_params),
                            replay,
                            next,
                        },
                        Some(GenIteration::Error {
                            generator, message, ..
                        }) => GenIteration::Error {
                            generator,
                            message,
                            replay,
                        },
                        Some(GenIteration::Discard { .. }) | None => {
                            GenIteration::Discard { replay, next }
                        }
                    }
                }
                GenIteration::Discard { replay, next } => GenIteration::Discard { replay, next },
                GenIteration::Error {
                    generator,
                    message,
                    replay,
                } => GenIteration::Error {
                    generator,
                    message,
                    replay,
                },
            }))
        })
    }

    /// Filter generated values by a predicate.
    ///
    /// Rejected instances become discards. After [`DEFAULT_DISCARD_BREAKER`]
    /// consecutive discards the size jumps with [`Size::big_increment`].
    pub fn filter<P>(self, pred: P) -> Gen<T>
    where
        T: Clone,
        P: Fn(&T) -> bool + 'static,
    {
        self.filter_with_breaker(pred, DEFAULT_DISCARD_BREAKER)
    }

    /// [`Gen::filter`] with a custom number of consecutive discards before
    /// resizing.
    pub fn filter_with_breaker<P>(self, pred: P, breaker: usize) -> Gen<T>
    where
        T: Clone,
        P: Fn(&T) -> bool + 'static,
    {
        let pred: Rc<dyn Fn(&T) -> bool> = Rc::new(pred);
        let breaker = breaker.max(1);
        Gen::new(move |params| {
            Box::new(Filter {
                source: self.clone(),
                pred: pred.clone(),
                breaker,
                upstream: self.run(params),
                consecutive: 0,
            })
        })
    }

    /// Generate a pair from two independent generators.
    pub fn zip<U>(self, other: Gen<U>) -> Gen<(T, U)>
    where
        T: Clone,
        U: Clone + 'static,
    {
        Gen::from_fn(move |params| {
            let (next_seed, work) = params.seed.fork();
            let (left_seed, right_seed) = work.fork();
            let next = params.with_seed(next_seed);

            let left = self.run(params.with_seed(left_seed)).next();
            let right = other.run(params.with_seed(right_seed)).next();
            match (left, right) {
                (
                    Some(GenIteration::Instance { space: left, .. }),
                    Some(GenIteration::Instance { space: right, .. }),
                ) => GenIteration::Instance {
                    space: ExampleSpace::zip(left, right),
                    replay: params,
                    next,
                },
                (Some(GenIteration::Error { generator, message, .. }), _)
                | (_, Some(GenIteration::Error { generator, message, .. })) => GenIteration::Error {
                    generator,
                    message,
                    replay: params,
                },
                _ => GenIteration::Discard {
                    replay: params,
                    next,
                },
            }
        })
    }

    /// Keep generated values as they are, never shrinking them.
    pub fn no_shrink(self) -> Gen<T> {
        Gen::new(move |params| {
            Box::new(
                self.run(params)
                    .map(|iteration| iteration.map_space(|space| ExampleSpace::leaf(space.current))),
            )
        })
    }

    /// The first generated space for `params`, skipping discards.
    pub fn first_space(&self, params: GenParameters) -> Result<ExampleSpace<T>> {
        self.first_instance(params).map(|(space, _)| space)
    }

    /// Generate `count` values with sizes spread from 0 to 100.
    pub fn sample(&self, count: usize, seed: u64) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let mut params = GenParameters::new(Seed::from_u64(seed), Size::MIN);
        let mut values = Vec::with_capacity(count);
        for i in 0..count {
            params = params.with_size(Size::new(i * Size::MAX.get() / count.max(1)));
            let (space, next) = self.first_instance(params)?;
            values.push(space.current.value);
            params = next;
        }
        Ok(values)
    }

    fn first_instance(&self, params: GenParameters) -> Result<(ExampleSpace<T>, GenParameters)> {
        let mut discards = 0;
        for iteration in self.run(params) {
            match iteration {
                GenIteration::Instance { space, next, .. } => return Ok((space, next)),
                GenIteration::Discard { .. } => {
                    discards += 1;
                    if discards > SAMPLE_DISCARD_LIMIT {
                        return Err(LodestarError::Exhausted {
                            discards,
                            ceiling: SAMPLE_DISCARD_LIMIT,
                        });
                    }
                }
                GenIteration::Error {
                    generator, message, ..
                } => return Err(LodestarError::GenerationFailed { generator, message }),
            }
        }

        Err(LodestarError::GenerationFailed {
            generator: "gen".to_string(),
            message: "generator produced no iterations".to_string(),
        })
    }
}

/// Seed for the downstream side of a bind, forked from the upstream's work
/// seed so it is independent of the upstream value.
fn downstream_seed(upstream: Seed) -> Seed {
    let (_, work) = upstream.fork();
    work.fork().1
}

fn join<T, U>(
    upstream: ExampleSpace<T>,
    downstream: ExampleSpace<U>,
    f: Rc<dyn Fn(&T) -> Gen<U>>,
    params: GenParameters,
) -> ExampleSpace<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    let current = Example::new(
        upstream.current.id.combine(downstream.current.id),
        downstream.current.value.clone(),
        upstream.current.distance + downstream.current.distance,
    );

    ExampleSpace::new(current, move || {
        let regenerate = f.clone();
        let upstream_shrinks = upstream.subspace().filter_map(move |child| {
            match regenerate(child.value()).run(params).next() {
                Some(GenIteration::Instance { space, .. }) => {
                    Some(join(child, space, regenerate.clone(), params))
                }
                _ => None,
            }
        });

        let (fixed, f) = (upstream.clone(), f.clone());
        let downstream_shrinks = downstream
            .subspace()
            .map(move |child| join(fixed.clone(), child, f.clone(), params));

        Box::new(upstream_shrinks.chain(downstream_shrinks))
    })
}

struct Filter<T> {
    source: Gen<T>,
    pred: Rc<dyn Fn(&T) -> bool>,
    breaker: usize,
    upstream: Iterations<T>,
    consecutive: usize,
}

impl<T: Clone + 'static> Iterator for Filter<T> {
    type Item = GenIteration<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let (replay, next) = match self.upstream.next()? {
            GenIteration::Instance {
                space,
                replay,
                next,
            } => {
                let pred = self.pred.clone();
                if let Some(space) = space.filter(move |value| pred(value)) {
                    self.consecutive = 0;
                    return Some(GenIteration::Instance {
                        space,
                        replay,
                        next,
                    });
                }
                (replay, next)
            }
            GenIteration::Discard { replay, next } => (replay, next),
            error @ GenIteration::Error { .. } => return Some(error),
        };

        self.consecutive += 1;
        if self.consecutive < self.breaker {
            return Some(GenIteration::Discard { replay, next });
        }

        self.consecutive = 0;
        let resized = next.with_size(next.size.big_increment());
        trace!(size = resized.size.get(), "filter breaker resizing");
        self.upstream = self.source.run(resized);
        Some(GenIteration::Discard {
            replay,
            next: resized,
        })
    }
}

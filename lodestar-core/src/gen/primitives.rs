//! Primitive generators.

use super::{Gen, GenIteration};
use crate::data::GenParameters;
use crate::shrink::{self, Shrinks};
use crate::space::{ExampleId, ExampleSpace};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::iter;
use std::rc::Rc;

impl<T: Clone + Hash + 'static> Gen<T> {
    /// Create a generator that always produces the same value.
    pub fn constant(value: T) -> Self {
        Gen::from_fn(move |params: GenParameters| GenIteration::Instance {
            space: ExampleSpace::singleton(value.clone()),
            replay: params,
            next: params.fork().0,
        })
    }
}

impl Gen<bool> {
    /// Generate a random boolean, shrinking to `false`.
    pub fn bool() -> Self {
        Gen::from_fn(|params: GenParameters| {
            let (next_seed, work) = params.seed.fork();
            let (value, _) = work.next_bool();
            let space = ExampleSpace::unfold(
                value,
                |b: &bool| -> Shrinks<bool> {
                    if *b {
                        Box::new(iter::once(false))
                    } else {
                        Box::new(iter::empty())
                    }
                },
                |b: &bool| if *b { 100.0 } else { 0.0 },
                |b: &bool| ExampleId::of(b),
            );
            GenIteration::Instance {
                space,
                replay: params,
                next: params.with_seed(next_seed),
            }
        })
    }
}

/// Integer types that can be generated from a range.
pub trait Integral: Copy + Clone + Hash + Debug + 'static {
    const NAME: &'static str;
    const MIN: Self;
    const MAX: Self;

    fn to_i128(self) -> i128;

    /// Only called with values inside `[MIN, MAX]`.
    fn from_i128(value: i128) -> Self;
}

macro_rules! integral {
    ($($t:ty),*) => {
        $(
            impl Integral for $t {
                const NAME: &'static str = stringify!($t);
                const MIN: Self = <$t>::MIN;
                const MAX: Self = <$t>::MAX;

                fn to_i128(self) -> i128 {
                    self as i128
                }

                fn from_i128(value: i128) -> Self {
                    value as $t
                }
            }
        )*
    };
}

integral!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: Integral> Gen<T> {
    /// Generate an integer in `[min, max]`, shrinking towards the value of
    /// the range closest to zero.
    ///
    /// The bounds scale with the size: at size 0 only the origin is
    /// produced, at size 100 the whole range.
    pub fn int_range(min: T, max: T) -> Self {
        let (low, high) = (min.to_i128(), max.to_i128());
        let origin = if low > 0 {
            low
        } else if high < 0 {
            high
        } else {
            0
        };
        integral_gen(T::NAME, low, high, origin)
    }

    /// Generate an integer in `[min, max]`, shrinking towards `origin`.
    pub fn int_range_with_origin(min: T, max: T, origin: T) -> Self {
        integral_gen(T::NAME, min.to_i128(), max.to_i128(), origin.to_i128())
    }

    /// Generate a positive integer.
    pub fn positive() -> Self {
        Self::int_range(T::from_i128(1), T::MAX)
    }

    /// Generate a natural number (including zero).
    pub fn natural() -> Self {
        Self::int_range(T::from_i128(0), T::MAX)
    }
}

fn integral_gen<T: Integral>(name: &'static str, min: i128, max: i128, origin: i128) -> Gen<T> {
    if min > max {
        return Gen::error(name, format!("invalid range: min {min} is greater than max {max}"));
    }
    if origin < min || origin > max {
        return Gen::error(name, format!("origin {origin} is outside [{min}, {max}]"));
    }

    let extent = (origin - min).max(max - origin) as u128;
    Gen::from_fn(move |params: GenParameters| {
        let (next_seed, work) = params.seed.fork();
        let low = origin - params.size.scale_extent((origin - min) as u128) as i128;
        let high = origin + params.size.scale_extent((max - origin) as u128) as i128;
        let (value, _) = work.next_in_range(low, high);

        let space = ExampleSpace::unfold(
            value,
            shrink::towards(origin),
            move |v: &i128| {
                if extent == 0 {
                    0.0
                } else {
                    (v - origin).unsigned_abs() as f64 * 100.0 / extent as f64
                }
            },
            |v: &i128| ExampleId::of(v),
        );
        GenIteration::Instance {
            space: space.map(|v| T::from_i128(*v)),
            replay: params,
            next: params.with_seed(next_seed),
        }
    })
}

impl<T: Clone + 'static> Gen<T> {
    /// Pick one of `choices`, shrinking towards the first.
    pub fn element(choices: Vec<T>) -> Self {
        if choices.is_empty() {
            return Gen::error("element", "no choices to pick from");
        }

        let choices = Rc::new(choices);
        Gen::<usize>::int_range(0, choices.len() - 1).map(move |index| choices[*index].clone())
    }
}

impl<T: Clone + 'static> Gen<Vec<T>> {
    /// Generate a list whose length is in `[min_length, max_length]`.
    ///
    /// Lists shrink structurally first (halves, then single removals) and
    /// element by element afterwards.
    pub fn list_of(element: Gen<T>, min_length: usize, max_length: usize) -> Self {
        if min_length > max_length {
            return Gen::error(
                "list_of",
                format!("invalid length range: min {min_length} is greater than max {max_length}"),
            );
        }

        let structural = list_shrink::<T>(min_length);
        Gen::from_fn(move |params: GenParameters| {
            let (next_seed, work) = params.seed.fork();
            let next = params.with_seed(next_seed);

            let extent = params.size.scale_extent((max_length - min_length) as u128) as i128;
            let (length, mut seed) = work.next_in_range(min_length as i128, min_length as i128 + extent);

            let mut spaces = Vec::with_capacity(length as usize);
            for _ in 0..length {
                let (continuation, element_seed) = seed.fork();
                seed = continuation;
                match element.run(params.with_seed(element_seed)).next() {
                    Some(GenIteration::Instance { space, .. }) => spaces.push(space),
                    Some(GenIteration::Error {
                        generator, message, ..
                    }) => {
                        return GenIteration::Error {
                            generator,
                            message,
                            replay: params,
                        }
                    }
                    Some(GenIteration::Discard { .. }) | None => {
                        return GenIteration::Discard {
                            replay: params,
                            next,
                        }
                    }
                }
            }

            let space = ExampleSpace::merge(
                spaces,
                |values: &[T]| values.to_vec(),
                structural.clone(),
                move |spaces: &[ExampleSpace<T>]| list_distance(spaces, min_length, max_length),
            );
            GenIteration::Instance {
                space,
                replay: params,
                next,
            }
        })
    }
}

impl<A, B> Gen<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    /// Generate a pair; components are generated independently.
    pub fn tuple_of2(a: Gen<A>, b: Gen<B>) -> Self {
        a.zip(b)
    }
}

impl<A, B, C> Gen<(A, B, C)>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
{
    /// Generate a triple; components are generated independently.
    pub fn tuple_of3(a: Gen<A>, b: Gen<B>, c: Gen<C>) -> Self {
        a.zip(b)
            .zip(c)
            .map(|((a, b), c)| (a.clone(), b.clone(), c.clone()))
    }
}

/// Structural shrinks of a list of spaces, deduplicated by element identity.
fn list_shrink<T: Clone + 'static>(
    min_length: usize,
) -> impl Fn(&Vec<ExampleSpace<T>>) -> Shrinks<Vec<ExampleSpace<T>>> + Clone {
    let structural = shrink::concat(shrink::bisect(min_length), shrink::drop_one(min_length));
    move |spaces| {
        let mut seen = HashSet::new();
        Box::new(structural(spaces).filter(move |candidate: &Vec<ExampleSpace<T>>| {
            seen.insert(candidate.iter().map(|space| space.current.id).collect::<Vec<_>>())
        }))
    }
}

/// Distance on a 0 to 100 scale where a shorter list is always simpler than
/// a longer one. Within one length, the mean element distance decides.
fn list_distance<T>(spaces: &[ExampleSpace<T>], min_length: usize, max_length: usize) -> f64 {
    let steps = (max_length - min_length) as f64 + 1.0;
    let length_part = spaces.len().saturating_sub(min_length) as f64;
    let element_part = if spaces.is_empty() {
        0.0
    } else {
        let mean = spaces.iter().map(|space| space.current.distance).sum::<f64>() / spaces.len() as f64;
        mean.clamp(0.0, 100.0) * ELEMENT_WEIGHT / 100.0
    };
    100.0 * (length_part + element_part) / steps
}

/// Keeps the element part of [`list_distance`] below one length step.
const ELEMENT_WEIGHT: f64 = 0.99;

//! Core data types: the splittable random source, size and run configuration.

use crate::error::{LodestarError, Result};
use std::fmt;

/// Size parameter for controlling the extent of generated values.
///
/// Size is always within `[0, 100]`. At size 0 generators produce their
/// simplest value (the origin of a range, the minimum length of a list); at
/// size 100 they may use their whole range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Size(u8);

impl Size {
    /// The smallest size.
    pub const MIN: Size = Size(0);

    /// The largest size.
    pub const MAX: Size = Size(100);

    /// Create a new size, clamping to `[0, 100]`.
    pub fn new(value: usize) -> Self {
        Size(value.min(Self::MAX.0 as usize) as u8)
    }

    /// Get the inner size value.
    pub fn get(&self) -> usize {
        self.0 as usize
    }

    /// Whether this is the largest possible size.
    pub fn is_max(&self) -> bool {
        *self == Self::MAX
    }

    /// Nudge the size towards the maximum by a small step.
    pub fn increment(&self) -> Self {
        Size::new(self.get() + 1)
    }

    /// Jump towards the maximum, used to escape regions where generation is
    /// too constrained.
    pub fn big_increment(&self) -> Self {
        Size::new(self.get() + 10)
    }

    /// Scale an extent in proportion to this size.
    ///
    /// `Size::MIN` always yields 0 and `Size::MAX` yields the full extent.
    pub fn scale_extent(&self, extent: u128) -> u128 {
        extent.saturating_mul(self.0 as u128) / Self::MAX.0 as u128
    }
}

impl Default for Size {
    fn default() -> Self {
        Size::MIN
    }
}

impl From<usize> for Size {
    fn from(value: usize) -> Self {
        Size::new(value)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size({})", self.0)
    }
}

/// Splittable random seed for deterministic generation.
///
/// Seeds are immutable: every operation returns the seed to continue with.
/// Forking produces an independent child stream without disturbing the
/// parent's continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed(pub u64, pub u64);

impl Seed {
    /// Create a new seed from a single value.
    pub fn from_u64(value: u64) -> Self {
        let state = splitmix64_mix(value);
        let gamma = mix_gamma(state);
        Seed(state, gamma)
    }

    /// Fork a seed into the parent's continuation and an independent child.
    /// Uses the SplitMix64 splitting strategy.
    pub fn fork(self) -> (Self, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        let new_gamma = mix_gamma(output);

        (Seed(new_state, gamma), Seed(output, new_gamma))
    }

    /// Generate the next random value and advance the seed.
    pub fn next_u64(self) -> (u64, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        (output, Seed(new_state, gamma))
    }

    /// Generate a bounded random value in `[0, bound)`.
    pub fn next_bounded(self, bound: u64) -> (u64, Self) {
        let (value, new_seed) = self.next_u64();
        (((value as u128 * bound as u128) >> 64) as u64, new_seed)
    }

    /// Generate a random bool.
    pub fn next_bool(self) -> (bool, Self) {
        let (value, new_seed) = self.next_u64();
        (value & 1 == 1, new_seed)
    }

    /// Generate a value uniformly in the inclusive range `[min, max]`.
    ///
    /// The bounds are swapped if given in the wrong order.
    pub fn next_in_range(self, min: i128, max: i128) -> (i128, Self) {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        let span = (high - low) as u128 + 1;
        let (high_bits, seed) = self.next_u64();
        let (low_bits, seed) = seed.next_u64();
        let raw = ((high_bits as u128) << 64) | low_bits as u128;
        // 128 random bits over at most a 64-bit span keeps modulo bias negligible.
        (low + (raw % span) as i128, seed)
    }

    /// Generate a random seed.
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Seed::from_u64(rng.gen())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, {})", self.0, self.1)
    }
}

/// The pair that fully determines one generator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenParameters {
    pub seed: Seed,
    pub size: Size,
}

impl GenParameters {
    pub fn new(seed: Seed, size: Size) -> Self {
        GenParameters { seed, size }
    }

    pub fn with_seed(self, seed: Seed) -> Self {
        GenParameters { seed, ..self }
    }

    pub fn with_size(self, size: Size) -> Self {
        GenParameters { size, ..self }
    }

    /// Fork the seed: the first parameters continue the parent, the second
    /// are an independent child at the same size.
    pub fn fork(self) -> (Self, Self) {
        let (parent, child) = self.seed.fork();
        (self.with_seed(parent), self.with_seed(child))
    }
}

impl fmt::Display for GenParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.seed, self.size)
    }
}

/// How the check loop picks the size of the next iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeStrategy {
    /// Small increments until a counterexample is known, big increments after.
    #[default]
    Progressive,
    /// Spread sizes evenly over the iteration budget until a counterexample
    /// is known, big increments after.
    Linear,
    /// Never change the size.
    Fixed,
}

impl ResizeStrategy {
    /// Compute the size for the iteration that follows `completed` iterations.
    pub fn resize(
        &self,
        current: Size,
        completed: usize,
        iterations: usize,
        has_counterexample: bool,
    ) -> Size {
        match self {
            ResizeStrategy::Fixed => current,
            _ if has_counterexample => current.big_increment(),
            ResizeStrategy::Progressive => current.increment(),
            ResizeStrategy::Linear => {
                Size::new((completed * Size::MAX.get()) / iterations.max(1))
            }
        }
    }
}

/// Configuration for a check run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of passing iterations to run before declaring success.
    pub iterations: usize,

    /// Maximum number of shrinks to attempt across the whole run.
    pub shrink_limit: usize,

    /// Seed for the run. `None` draws a random seed.
    pub seed: Option<u64>,

    /// Size of the first iteration.
    pub size: Size,

    /// Keep searching for smaller counterexamples after the first one.
    pub deep_check: bool,

    /// Replay token from a previous failing run.
    pub replay: Option<String>,

    /// Maximum number of consecutive discards before giving up.
    pub discard_ceiling: usize,

    /// Number of identical recent counterexamples that count as a plateau.
    pub plateau_window: usize,

    /// Sizing policy between iterations.
    pub resize: ResizeStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            iterations: 100,
            shrink_limit: 500,
            seed: None,
            size: Size::MIN,
            deep_check: true,
            replay: None,
            discard_ceiling: 100,
            plateau_window: 3,
            resize: ResizeStrategy::Progressive,
        }
    }
}

impl Config {
    /// Set the number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the shrink limit.
    pub fn with_shrinks(mut self, shrinks: usize) -> Self {
        self.shrink_limit = shrinks;
        self
    }

    /// Fix the seed of the run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the size of the first iteration.
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Replay a previously reported failure.
    pub fn with_replay(mut self, token: impl Into<String>) -> Self {
        self.replay = Some(token.into());
        self
    }

    /// Stop at the first counterexample instead of searching for smaller ones.
    pub fn without_deep_check(mut self) -> Self {
        self.deep_check = false;
        self
    }

    pub fn with_discard_ceiling(mut self, ceiling: usize) -> Self {
        self.discard_ceiling = ceiling;
        self
    }

    pub fn with_plateau_window(mut self, window: usize) -> Self {
        self.plateau_window = window;
        self
    }

    pub fn with_resize(mut self, resize: ResizeStrategy) -> Self {
        self.resize = resize;
        self
    }

    /// Check that the configuration can drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.plateau_window == 0 {
            return Err(LodestarError::InvalidConfig {
                message: "plateau window must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// SplitMix64 mixing function for high-quality output.
pub(crate) fn splitmix64_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generate a good gamma value for SplitMix64 splitting.
fn mix_gamma(mut z: u64) -> u64 {
    z = splitmix64_mix(z);
    // Ensure gamma is odd for maximal period
    (z | 1).wrapping_mul(0x9e3779b97f4a7c15)
}

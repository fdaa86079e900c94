//! Error types for the Lodestar engine.

use thiserror::Error;

/// Main error type for Lodestar.
///
/// Counterexamples and generator failures are not errors: they are reported
/// through [`CheckReport`](crate::check::CheckReport). These variants cover
/// the conditions where a run cannot produce a meaningful report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LodestarError {
    /// A generator could not proceed with the given parameters.
    #[error("Generator {generator} failed: {message}")]
    GenerationFailed { generator: String, message: String },

    /// Too many consecutive test cases were discarded.
    #[error("Exhausted after {discards} consecutive discards (ceiling: {ceiling})")]
    Exhausted { discards: usize, ceiling: usize },

    /// A replay token no longer leads to a value; the generator changed.
    #[error("Replay token {token} is no longer valid for this property; regenerate it by running the check without replay")]
    ReplayInvalidated { token: String },

    /// A replay token could not be decoded.
    #[error("Malformed replay token: {reason}")]
    MalformedReplay { reason: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A type was encountered again while resolving its own generator.
    #[error("Circular reference to {type_name} at {path}")]
    CircularReference { type_name: String, path: String },

    /// No generator strategy is registered for a type.
    #[error("No generator registered for {type_name} at {path}")]
    NoGenerator { type_name: String, path: String },

    /// A registered strategy produced a generator of the wrong type.
    #[error("Registered generator for {type_name} has a different type")]
    FactoryTypeMismatch { type_name: String },
}

/// Result type for Lodestar operations.
pub type Result<T> = std::result::Result<T, LodestarError>;

//! Core functionality for Lodestar property-based testing.
//!
//! This crate provides the search engine behind Lodestar: example spaces,
//! shrink functions, generators, properties and the check loop that finds
//! and shrinks counterexamples.

pub mod check;
pub mod data;
pub mod error;
pub mod factory;
pub mod gen;
pub mod property;
pub mod replay;
pub mod shrink;
pub mod space;

// Re-export the main types
pub use check::*;
pub use data::*;
pub use error::*;
pub use factory::*;
pub use gen::*;
pub use property::*;
pub use replay::*;
pub use shrink::Shrinks;
pub use space::*;

//! Lodestar property-based testing library.
//!
//! This is the main entry point for Lodestar. Generators are explicit
//! values, every failure is shrunk to a small counterexample, and every
//! report carries a token that replays the failure exactly.
//!
//! ```
//! use lodestar::*;
//!
//! let property = Property::for_all(Gen::int_range(0, 100), |&x| x < 50);
//! let report = property.check(&Config::default().with_seed(7)).unwrap();
//!
//! assert!(!report.passed);
//! assert_eq!(report.counterexample.unwrap().value, 50);
//! ```

pub use lodestar_core::*;

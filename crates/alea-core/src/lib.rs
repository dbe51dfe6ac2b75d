//! # Alea Core
//!
//! Discrete probability spaces, event algebra and multi-hypothesis Bayesian
//! updates.
//!
//! Two independent components share this crate:
//!
//! - [`ProbabilitySpace`] with its [`EventAlgebra`] view answers questions about
//!   named events over a finite, equiprobable sample space.
//! - [`BayesEngine`] turns priors and likelihood tables into posteriors.
//!
//! Both are plain owned values; nothing here is global or shared.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use alea_core::ProbabilitySpace;
//!
//! let mut dice = ProbabilitySpace::product([1..=6, 1..=6])?;
//! dice.define_event_where("Sum7", |roll| roll[0] + roll[1] == 7)?;
//! let p = dice.algebra().probability_of("Sum7")?;
//! assert_eq!(p.result.fraction.to_string(), "1/6");
//! ```
//!
//! ## Features
//!
//! - `serde`: serialization of every result record, plus the [`scenario`] module
//! - `tracing`: debug events for registrations and updates

#![forbid(unsafe_code)]

pub mod engine;
#[cfg(feature = "serde")]
pub mod scenario;

// Re-export commonly used types
pub use engine::algebra::{AlgebraConfig, EventAlgebra, ProbabilityResult};
pub use engine::bayes::{BayesConfig, BayesEngine, BayesState, ChangeBand, PosteriorResult};
pub use engine::errors::{ProbError, ProbResult};
pub use engine::fraction::Fraction;
pub use engine::space::{Event, ProbabilitySpace};
pub use engine::tree::{Branch, ProbabilityTree};

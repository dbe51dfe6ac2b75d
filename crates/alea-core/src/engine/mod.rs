//! The probabilistic reasoning engine.
//!
//! This module provides:
//! - **errors**: Error taxonomy shared by every operation
//! - **fraction**: Reduced rational numbers for exact display
//! - **space**: Sample spaces and the named-event registry
//! - **algebra**: Union, intersection, complement, conditional and independence queries
//! - **bayes**: Priors, likelihoods and posterior updates over named hypotheses
//! - **tree**: Probability trees for sequences of binary trials

pub mod algebra;
pub mod bayes;
pub mod errors;
pub mod fraction;
pub mod space;
pub mod tree;

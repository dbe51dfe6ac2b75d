//! Error types for probability-space and Bayesian operations.

use thiserror::Error;

/// Result alias used across the engine.
pub type ProbResult<T> = Result<T, ProbError>;

/// Errors raised by the event algebra, the Bayes engine and the probability tree.
///
/// Every variant is a rejected input: operations validate eagerly and leave the
/// receiver untouched when they fail. Nothing is retried internally.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// without breaking callers.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbError {
    /// An event lists outcomes that are not part of the current sample space.
    #[error("invalid event '{name}': {outside} outcome(s) are not in the sample space")]
    InvalidEvent { name: String, outside: usize },

    /// A sample space was defined without any outcome.
    #[error("sample space must contain at least one outcome")]
    EmptySampleSpace,

    /// Lookup of an event (or hypothesis) name that was never defined.
    #[error("undefined event '{0}'")]
    UndefinedEvent(String),

    /// Conditioning on an event of probability zero.
    #[error("cannot condition '{event}' on '{given}': P({given}) = 0")]
    DivisionByZero { event: String, given: String },

    /// Priors do not form a probability distribution.
    #[error("invalid prior: {0}")]
    InvalidPrior(String),

    /// A likelihood table references a hypothesis missing from the priors.
    #[error("likelihood references unknown hypothesis '{0}'")]
    UnknownHypothesis(String),

    /// A likelihood value is not a probability.
    #[error("invalid likelihood P({evidence}|{hypothesis}) = {value}")]
    InvalidLikelihood {
        hypothesis: String,
        evidence: String,
        value: f64,
    },

    /// No hypothesis with nonzero prior explains the evidence.
    #[error("probability of evidence '{0}' is 0")]
    ZeroEvidenceProbability(String),

    /// A branch probability outside [0, 1].
    #[error("invalid probability {value} at {context}")]
    InvalidProbability { value: f64, context: String },

    /// Configuration or scenario validation failure.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Internal error (programmer error, not user error).
    #[error("internal error: {0}")]
    Internal(String),
}

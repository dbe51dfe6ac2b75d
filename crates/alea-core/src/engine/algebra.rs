//! Event algebra over a [`ProbabilitySpace`].
//!
//! Every query resolves event names against the registry and reports its answer
//! as typed records: an exact [`Fraction`], the rounded floating value, a
//! percentage and the formula that produced it. Probabilities are computed from
//! set cardinalities under the equiprobable-outcome model, P(A) = |A| / |Ω|.
//!
//! ## Union
//!
//! [`EventAlgebra::probability_of_union`] decides between the additive rule for
//! mutually exclusive events and inclusion-exclusion itself. Both branches agree
//! with |A ∪ B| / |Ω| exactly.
//!
//! ## Tolerances
//!
//! Independence compares floating values within
//! [`AlgebraConfig::independence_tolerance`]; nothing in this module compares
//! floats for exact equality.

use std::collections::BTreeSet;

use crate::engine::errors::{ProbError, ProbResult};
use crate::engine::fraction::Fraction;
use crate::engine::space::{Event, ProbabilitySpace};

pub const FORMULA_SIMPLE: &str = "P(A) = |A| / |Ω|";
pub const FORMULA_INTERSECTION: &str = "P(A ∩ B) = |A ∩ B| / |Ω|";
pub const FORMULA_UNION_EXCLUSIVE: &str = "P(A ∪ B) = P(A) + P(B)";
pub const FORMULA_UNION_GENERAL: &str = "P(A ∪ B) = P(A) + P(B) - P(A ∩ B)";
pub const FORMULA_COMPLEMENT: &str = "P(A') = 1 - P(A)";
pub const FORMULA_CONDITIONAL: &str = "P(A|B) = P(A ∩ B) / P(B)";
pub const FORMULA_INDEPENDENT_INTERSECTION: &str = "P(A ∩ B) = P(A) × P(B)";
pub const FORMULA_INDEPENDENT_UNION: &str = "P(A ∪ B) = P(A) + P(B) - P(A) × P(B)";

/// Largest number of decimals accepted for rounding; beyond this f64 has no digits left.
const MAX_DECIMALS: u32 = 15;

/// Tuning knobs for event-algebra queries.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlgebraConfig {
    /// Absolute tolerance for `|P(A ∩ B) - P(A)·P(B)|` in independence checks.
    pub independence_tolerance: f64,
    /// Decimals kept in [`ProbabilityResult::probability`].
    pub probability_decimals: u32,
    /// Decimals kept in [`ProbabilityResult::percentage`].
    pub percentage_decimals: u32,
}

impl Default for AlgebraConfig {
    fn default() -> Self {
        Self {
            independence_tolerance: 1e-10,
            probability_decimals: 4,
            percentage_decimals: 2,
        }
    }
}

impl AlgebraConfig {
    pub fn validate(self) -> ProbResult<Self> {
        if !self.independence_tolerance.is_finite() || self.independence_tolerance <= 0.0 {
            return Err(ProbError::ValidationError(
                "algebra: independence_tolerance must be finite and > 0".into(),
            ));
        }
        if self.probability_decimals > MAX_DECIMALS || self.percentage_decimals > MAX_DECIMALS {
            return Err(ProbError::ValidationError(format!(
                "algebra: decimals must be at most {}",
                MAX_DECIMALS
            )));
        }
        Ok(self)
    }
}

/// A probability in every representation a consumer may want to display.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProbabilityResult {
    /// Exact value in lowest terms.
    pub fraction: Fraction,
    /// Floating value rounded to [`AlgebraConfig::probability_decimals`].
    pub probability: f64,
    /// Percentage rounded to [`AlgebraConfig::percentage_decimals`].
    pub percentage: f64,
    /// The rule that produced the value.
    pub formula: &'static str,
}

impl ProbabilityResult {
    fn new(fraction: Fraction, formula: &'static str, config: &AlgebraConfig) -> Self {
        let exact = fraction.to_f64();
        Self {
            fraction,
            probability: round_to(exact, config.probability_decimals),
            percentage: round_to(exact * 100.0, config.percentage_decimals),
            formula,
        }
    }

    /// Unrounded floating value of the exact fraction.
    pub fn exact(&self) -> f64 {
        self.fraction.to_f64()
    }
}

/// `P(A)` for a registered event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EventProbability<T> {
    pub event: String,
    pub outcomes: Vec<T>,
    pub cardinality: usize,
    pub space_cardinality: usize,
    pub result: ProbabilityResult,
}

/// `P(A ∪ B)` with the ingredients of whichever rule applied.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnionProbability<T> {
    pub union: ProbabilityResult,
    pub a: ProbabilityResult,
    pub b: ProbabilityResult,
    pub intersection: ProbabilityResult,
    pub mutually_exclusive: bool,
    pub intersection_outcomes: Vec<T>,
}

/// `P(A')` together with the complement's outcomes `Ω \ A`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComplementProbability<T> {
    pub complement: ProbabilityResult,
    pub event: ProbabilityResult,
    pub outcomes: Vec<T>,
    pub cardinality: usize,
}

/// `P(A|B)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConditionalProbability<T> {
    pub conditional: ProbabilityResult,
    pub intersection: ProbabilityResult,
    pub given: ProbabilityResult,
    pub intersection_outcomes: Vec<T>,
}

/// Outcome of comparing `P(A ∩ B)` with `P(A)·P(B)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndependenceCheck {
    pub independent: bool,
    pub a: ProbabilityResult,
    pub b: ProbabilityResult,
    pub intersection: ProbabilityResult,
    /// `P(A)·P(B)` as a float.
    pub product: f64,
    /// `|P(A ∩ B) - P(A)·P(B)|`.
    pub difference: f64,
    pub tolerance: f64,
}

/// Joint probabilities computed as if A and B were independent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndependentJoint {
    pub a: ProbabilityResult,
    pub b: ProbabilityResult,
    pub intersection: ProbabilityResult,
    pub union: ProbabilityResult,
    /// Whether the data actually supports the independence assumption.
    pub independent: bool,
}

/// Read-only snapshot of Ω and every registered event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpaceSummary<T> {
    pub outcomes: Vec<T>,
    pub cardinality: usize,
    pub events: Vec<EventProbability<T>>,
}

/// Query view over a [`ProbabilitySpace`].
///
/// Holds a shared borrow of the space, so queries never observe a half-applied
/// redefinition.
#[derive(Debug, Clone, Copy)]
pub struct EventAlgebra<'a, T> {
    space: &'a ProbabilitySpace<T>,
    config: AlgebraConfig,
}

impl<'a, T: Ord + Clone> EventAlgebra<'a, T> {
    pub fn new(space: &'a ProbabilitySpace<T>) -> Self {
        Self {
            space,
            config: AlgebraConfig::default(),
        }
    }

    pub fn with_config(space: &'a ProbabilitySpace<T>, config: AlgebraConfig) -> ProbResult<Self> {
        Ok(Self {
            space,
            config: config.validate()?,
        })
    }

    pub fn config(&self) -> &AlgebraConfig {
        &self.config
    }

    /// `P(A) = |A| / |Ω|`, or 0 when Ω is empty.
    pub fn probability_of(&self, name: &str) -> ProbResult<EventProbability<T>> {
        let event = self.space.event(name)?;
        Ok(self.event_probability(event))
    }

    /// `A ∪ B` as a set.
    pub fn union_of(&self, a: &str, b: &str) -> ProbResult<BTreeSet<T>> {
        let (a, b) = self.pair(a, b)?;
        Ok(a.outcomes.union(&b.outcomes).cloned().collect())
    }

    /// `A ∩ B` as a set.
    pub fn intersection_of(&self, a: &str, b: &str) -> ProbResult<BTreeSet<T>> {
        let (a, b) = self.pair(a, b)?;
        Ok(a.outcomes.intersection(&b.outcomes).cloned().collect())
    }

    pub fn are_mutually_exclusive(&self, a: &str, b: &str) -> ProbResult<bool> {
        let (a, b) = self.pair(a, b)?;
        Ok(a.outcomes.is_disjoint(&b.outcomes))
    }

    /// `P(A ∪ B)`, choosing the additive rule when A and B are mutually exclusive
    /// and inclusion-exclusion otherwise.
    pub fn probability_of_union(&self, a: &str, b: &str) -> ProbResult<UnionProbability<T>> {
        let (event_a, event_b) = self.pair(a, b)?;
        let intersection: Vec<T> = event_a
            .outcomes
            .intersection(&event_b.outcomes)
            .cloned()
            .collect();
        let mutually_exclusive = intersection.is_empty();

        let p_a = self.ratio(event_a.cardinality());
        let p_b = self.ratio(event_b.cardinality());
        let p_ab = self.ratio(intersection.len());

        let (union, formula) = if mutually_exclusive {
            (p_a + p_b, FORMULA_UNION_EXCLUSIVE)
        } else {
            (p_a + p_b - p_ab, FORMULA_UNION_GENERAL)
        };

        Ok(UnionProbability {
            union: self.result(union, formula),
            a: self.result(p_a, FORMULA_SIMPLE),
            b: self.result(p_b, FORMULA_SIMPLE),
            intersection: self.result(p_ab, FORMULA_INTERSECTION),
            mutually_exclusive,
            intersection_outcomes: intersection,
        })
    }

    /// `P(A') = 1 - P(A)` and the outcomes of `Ω \ A`.
    pub fn probability_of_complement(&self, name: &str) -> ProbResult<ComplementProbability<T>> {
        let event = self.space.event(name)?;
        let p_a = self.ratio(event.cardinality());
        let outcomes: Vec<T> = self
            .space
            .outcomes()
            .difference(&event.outcomes)
            .cloned()
            .collect();

        Ok(ComplementProbability {
            complement: self.result(Fraction::one() - p_a, FORMULA_COMPLEMENT),
            event: self.result(p_a, FORMULA_SIMPLE),
            cardinality: outcomes.len(),
            outcomes,
        })
    }

    /// `P(A|B) = P(A ∩ B) / P(B)`.
    ///
    /// # Errors
    ///
    /// [`ProbError::DivisionByZero`] when `P(B) = 0`.
    pub fn probability_of_conditional(
        &self,
        a: &str,
        b: &str,
    ) -> ProbResult<ConditionalProbability<T>> {
        let (event_a, event_b) = self.pair(a, b)?;
        let p_b = self.ratio(event_b.cardinality());
        let intersection: Vec<T> = event_a
            .outcomes
            .intersection(&event_b.outcomes)
            .cloned()
            .collect();
        let p_ab = self.ratio(intersection.len());

        let conditional = p_ab.checked_div(p_b).ok_or_else(|| ProbError::DivisionByZero {
            event: a.to_string(),
            given: b.to_string(),
        })?;

        Ok(ConditionalProbability {
            conditional: self.result(conditional, FORMULA_CONDITIONAL),
            intersection: self.result(p_ab, FORMULA_INTERSECTION),
            given: self.result(p_b, FORMULA_SIMPLE),
            intersection_outcomes: intersection,
        })
    }

    /// Full independence comparison for A and B.
    pub fn independence(&self, a: &str, b: &str) -> ProbResult<IndependenceCheck> {
        let (event_a, event_b) = self.pair(a, b)?;
        let p_a = self.ratio(event_a.cardinality());
        let p_b = self.ratio(event_b.cardinality());
        let p_ab = self.ratio(event_a.outcomes.intersection(&event_b.outcomes).count());

        let product = p_a.to_f64() * p_b.to_f64();
        let difference = (p_ab.to_f64() - product).abs();
        let tolerance = self.config.independence_tolerance;

        Ok(IndependenceCheck {
            independent: difference < tolerance,
            a: self.result(p_a, FORMULA_SIMPLE),
            b: self.result(p_b, FORMULA_SIMPLE),
            intersection: self.result(p_ab, FORMULA_INTERSECTION),
            product,
            difference,
            tolerance,
        })
    }

    /// Whether `|P(A ∩ B) - P(A)·P(B)|` is within the configured tolerance.
    pub fn are_independent(&self, a: &str, b: &str) -> ProbResult<bool> {
        self.independence(a, b).map(|check| check.independent)
    }

    /// Intersection and union probabilities computed under the assumption that A
    /// and B are independent.
    ///
    /// The assumption is not enforced: when the registered sets contradict it the
    /// result is still returned with `independent == false`.
    pub fn probability_assuming_independence(
        &self,
        a: &str,
        b: &str,
    ) -> ProbResult<IndependentJoint> {
        let check = self.independence(a, b)?;

        #[cfg(feature = "tracing")]
        {
            if !check.independent {
                tracing::warn!(
                    a,
                    b,
                    difference = check.difference,
                    "events do not appear to be independent"
                );
            }
        }

        let p_a = check.a.fraction;
        let p_b = check.b.fraction;
        let joint = p_a * p_b;

        Ok(IndependentJoint {
            a: check.a,
            b: check.b,
            intersection: self.result(joint, FORMULA_INDEPENDENT_INTERSECTION),
            union: self.result(p_a + p_b - joint, FORMULA_INDEPENDENT_UNION),
            independent: check.independent,
        })
    }

    /// Ω and every registered event with its probability, in registration order.
    pub fn summary(&self) -> SpaceSummary<T> {
        SpaceSummary {
            outcomes: self.space.outcomes().iter().cloned().collect(),
            cardinality: self.space.cardinality(),
            events: self
                .space
                .events()
                .map(|event| self.event_probability(event))
                .collect(),
        }
    }

    fn pair(&self, a: &str, b: &str) -> ProbResult<(&'a Event<T>, &'a Event<T>)> {
        Ok((self.space.event(a)?, self.space.event(b)?))
    }

    fn event_probability(&self, event: &Event<T>) -> EventProbability<T> {
        EventProbability {
            event: event.name.clone(),
            outcomes: event.outcomes.iter().cloned().collect(),
            cardinality: event.cardinality(),
            space_cardinality: self.space.cardinality(),
            result: self.result(self.ratio(event.cardinality()), FORMULA_SIMPLE),
        }
    }

    fn ratio(&self, count: usize) -> Fraction {
        Fraction::ratio(count, self.space.cardinality())
    }

    fn result(&self, fraction: Fraction, formula: &'static str) -> ProbabilityResult {
        ProbabilityResult::new(fraction, formula, &self.config)
    }
}

/// Rounds half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10_f64.powi(decimals as i32);
    (value * scale).round() / scale
}

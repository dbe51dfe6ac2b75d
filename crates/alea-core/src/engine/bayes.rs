//! # Multi-hypothesis Bayesian updates
//!
//! [`BayesEngine`] holds a prior distribution over named hypotheses and a
//! likelihood table `P(E|H)` per hypothesis, and turns an observed evidence name
//! into a posterior distribution:
//!
//! ```text
//! P(E)   = Σ_h P(E|h) · P(h)              (law of total probability)
//! P(h|E) = P(E|h) · P(h) / P(E)           (Bayes' theorem)
//! ```
//!
//! Only hypotheses that define a likelihood for the evidence take part in either
//! sum. Results keep hypothesis insertion order.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --set_priors--> PriorsSet --set_likelihoods--> LikelihoodsSet | Ready
//! ```
//!
//! Replacing the priors discards the likelihood table. Posteriors are recomputed
//! on every request, so no result can outlive the inputs it was derived from.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut engine = BayesEngine::new();
//! engine.set_priors([("Sick", 0.01), ("Healthy", 0.99)])?;
//! engine.set_likelihoods([
//!     ("Sick", vec![("Positive", 0.95)]),
//!     ("Healthy", vec![("Positive", 0.10)]),
//! ])?;
//! let posterior = engine.compute_posterior("Positive")?;
//! // P(Sick|Positive) ≈ 0.0876
//! ```

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::engine::algebra::round_to;
use crate::engine::errors::{ProbError, ProbResult};
use crate::engine::fraction::Fraction;

/// Denominator bound for the displayed prior fraction.
const PRIOR_FRACTION_MAX_DENOMINATOR: u64 = 1_000_000;

/// Percent-change thresholds separating the qualitative bands.
const VERY_SIGNIFICANT_PCT: f64 = 50.0;
const SIGNIFICANT_PCT: f64 = 20.0;
const MODERATE_PCT: f64 = 5.0;

type HypothesisMap<V> = IndexMap<String, V, FxBuildHasher>;

/// Where the engine is in its configuration lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BayesState {
    /// No priors yet.
    Uninitialized,
    /// Priors set, no likelihood table.
    PriorsSet,
    /// Likelihoods set, but some hypothesis has no likelihood for any evidence.
    LikelihoodsSet,
    /// Every hypothesis has at least one likelihood.
    Ready,
}

/// Tuning knobs for the Bayes engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BayesConfig {
    /// Allowed deviation of `Σ P(h)` from 1.
    pub prior_sum_tolerance: f64,
    /// Decimals kept in [`PosteriorRecord::posterior_percentage`].
    pub percentage_decimals: u32,
    /// Denominator bound for [`PosteriorRecord::posterior_fraction`].
    pub fraction_max_denominator: u64,
}

impl Default for BayesConfig {
    fn default() -> Self {
        Self {
            prior_sum_tolerance: 1e-10,
            percentage_decimals: 2,
            fraction_max_denominator: 1000,
        }
    }
}

impl BayesConfig {
    pub fn validate(self) -> ProbResult<Self> {
        if !self.prior_sum_tolerance.is_finite() || self.prior_sum_tolerance <= 0.0 {
            return Err(ProbError::ValidationError(
                "bayes: prior_sum_tolerance must be finite and > 0".into(),
            ));
        }
        if self.percentage_decimals > 15 {
            return Err(ProbError::ValidationError(
                "bayes: percentage_decimals must be at most 15".into(),
            ));
        }
        if self.fraction_max_denominator == 0 {
            return Err(ProbError::ValidationError(
                "bayes: fraction_max_denominator must be > 0".into(),
            ));
        }
        Ok(self)
    }
}

/// One term `P(E|h) · P(h)` of the law of total probability.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EvidenceContribution {
    pub hypothesis: String,
    pub prior: f64,
    pub likelihood: f64,
    pub joint: f64,
}

/// `P(E)` with the contribution of every hypothesis that explains `E`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EvidenceProbability {
    pub evidence: String,
    pub probability: f64,
    pub contributions: Vec<EvidenceContribution>,
}

/// Posterior of a single hypothesis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PosteriorRecord {
    pub hypothesis: String,
    pub prior: f64,
    pub likelihood: f64,
    /// `likelihood · prior`
    pub numerator: f64,
    pub posterior: f64,
    pub posterior_percentage: f64,
    /// Best rational approximation of the prior.
    pub prior_fraction: Option<Fraction>,
    /// Best rational approximation of the posterior.
    pub posterior_fraction: Option<Fraction>,
}

/// Posterior distribution for one piece of evidence, in hypothesis insertion order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PosteriorResult {
    pub evidence: String,
    pub evidence_probability: f64,
    pub records: Vec<PosteriorRecord>,
    /// `Σ numerator`, equal to `evidence_probability`.
    pub total_numerator: f64,
    /// `Σ posterior`, 1 up to rounding.
    pub total_posterior: f64,
}

impl PosteriorResult {
    pub fn get(&self, hypothesis: &str) -> Option<&PosteriorRecord> {
        self.records.iter().find(|r| r.hypothesis == hypothesis)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PosteriorRecord> {
        self.records.iter()
    }
}

/// Qualitative reading of a percent change from prior to posterior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChangeBand {
    VerySignificantIncrease,
    SignificantIncrease,
    ModerateIncrease,
    NoSignificantChange,
    ModerateDecrease,
    SignificantDecrease,
    VerySignificantDecrease,
}

impl ChangeBand {
    /// Bands are open on the side closer to zero: +50% exactly is "significant".
    pub fn from_percent_change(pct: f64) -> Self {
        if pct > VERY_SIGNIFICANT_PCT {
            Self::VerySignificantIncrease
        } else if pct > SIGNIFICANT_PCT {
            Self::SignificantIncrease
        } else if pct > MODERATE_PCT {
            Self::ModerateIncrease
        } else if pct > -MODERATE_PCT {
            Self::NoSignificantChange
        } else if pct > -SIGNIFICANT_PCT {
            Self::ModerateDecrease
        } else if pct > -VERY_SIGNIFICANT_PCT {
            Self::SignificantDecrease
        } else {
            Self::VerySignificantDecrease
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VerySignificantIncrease => "very significant increase",
            Self::SignificantIncrease => "significant increase",
            Self::ModerateIncrease => "moderate increase",
            Self::NoSignificantChange => "no significant change",
            Self::ModerateDecrease => "moderate decrease",
            Self::SignificantDecrease => "significant decrease",
            Self::VerySignificantDecrease => "very significant decrease",
        }
    }
}

impl fmt::Display for ChangeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Prior versus posterior for one hypothesis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChangeRecord {
    pub hypothesis: String,
    pub prior: f64,
    pub posterior: f64,
    pub absolute_change: f64,
    /// `(posterior - prior) / prior · 100`; `None` when the prior is 0.
    pub percent_change: Option<f64>,
    /// `None` exactly when `percent_change` is.
    pub band: Option<ChangeBand>,
}

/// Everything a report needs about one evidence update.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BayesAnalysis {
    pub evidence: String,
    pub evidence_probability: f64,
    pub most_probable: PosteriorRecord,
    pub least_probable: PosteriorRecord,
    /// Largest defined percent change; `None` if every prior involved is 0.
    pub largest_increase: Option<ChangeRecord>,
    /// Smallest defined percent change.
    pub largest_decrease: Option<ChangeRecord>,
    pub posterior: PosteriorResult,
    pub comparisons: Vec<ChangeRecord>,
}

/// Maximum-a-posteriori decision for one evidence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Classification {
    pub evidence: String,
    pub hypothesis: String,
    /// Posterior of the chosen hypothesis.
    pub confidence: f64,
}

/// Priors, likelihoods and the posterior computations over them.
#[derive(Debug, Clone)]
pub struct BayesEngine {
    config: BayesConfig,
    priors: HypothesisMap<f64>,
    likelihoods: HypothesisMap<FxHashMap<String, f64>>,
    state: BayesState,
}

impl Default for BayesEngine {
    fn default() -> Self {
        Self {
            config: BayesConfig::default(),
            priors: HypothesisMap::default(),
            likelihoods: HypothesisMap::default(),
            state: BayesState::Uninitialized,
        }
    }
}

impl BayesEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BayesConfig) -> ProbResult<Self> {
        Ok(Self {
            config: config.validate()?,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &BayesConfig {
        &self.config
    }

    pub fn state(&self) -> BayesState {
        self.state
    }

    /// Replaces the prior distribution and clears the likelihood table.
    ///
    /// Later duplicates of a hypothesis name overwrite earlier ones but keep the
    /// first position.
    ///
    /// # Errors
    ///
    /// [`ProbError::InvalidPrior`] if the map is empty, a prior is not a
    /// probability, or the priors do not sum to 1 within
    /// [`BayesConfig::prior_sum_tolerance`]. The engine is unchanged on error.
    pub fn set_priors<K, I>(&mut self, priors: I) -> ProbResult<()>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut map = HypothesisMap::default();
        for (name, prior) in priors {
            let name = name.into();
            if !prior.is_finite() || !(0.0..=1.0).contains(&prior) {
                return Err(ProbError::InvalidPrior(format!(
                    "P({}) = {} is not a probability",
                    name, prior
                )));
            }
            map.insert(name, prior);
        }
        if map.is_empty() {
            return Err(ProbError::InvalidPrior(
                "at least one hypothesis is required".into(),
            ));
        }

        let sum: f64 = map.values().sum();
        if (sum - 1.0).abs() > self.config.prior_sum_tolerance {
            return Err(ProbError::InvalidPrior(format!(
                "priors must sum to 1, got {}",
                sum
            )));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            hypotheses = map.len(),
            discarded_likelihoods = self.likelihoods.len(),
            "priors set"
        );

        self.priors = map;
        self.likelihoods.clear();
        self.state = BayesState::PriorsSet;
        Ok(())
    }

    /// Replaces the likelihood table `hypothesis -> (evidence -> P(evidence|hypothesis))`.
    ///
    /// # Errors
    ///
    /// - [`ProbError::ValidationError`] if no priors have been set.
    /// - [`ProbError::UnknownHypothesis`] if a key is not a known hypothesis.
    /// - [`ProbError::InvalidLikelihood`] if a value is not a probability.
    ///
    /// The engine is unchanged on error.
    pub fn set_likelihoods<K, I, E, L>(&mut self, likelihoods: I) -> ProbResult<()>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, L)>,
        E: Into<String>,
        L: IntoIterator<Item = (E, f64)>,
    {
        if self.state == BayesState::Uninitialized {
            return Err(ProbError::ValidationError(
                "priors must be set before likelihoods".into(),
            ));
        }

        let mut table: HypothesisMap<FxHashMap<String, f64>> = HypothesisMap::default();
        for (hypothesis, row) in likelihoods {
            let hypothesis = hypothesis.into();
            if !self.priors.contains_key(&hypothesis) {
                return Err(ProbError::UnknownHypothesis(hypothesis));
            }
            let entry = table.entry(hypothesis.clone()).or_default();
            for (evidence, value) in row {
                let evidence = evidence.into();
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(ProbError::InvalidLikelihood {
                        hypothesis,
                        evidence,
                        value,
                    });
                }
                entry.insert(evidence, value);
            }
        }

        let complete = self
            .priors
            .keys()
            .all(|h| table.get(h).is_some_and(|row| !row.is_empty()));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            hypotheses = table.len(),
            complete,
            "likelihoods set"
        );

        self.likelihoods = table;
        self.state = if complete {
            BayesState::Ready
        } else {
            BayesState::LikelihoodsSet
        };
        Ok(())
    }

    /// Prior of `hypothesis`.
    ///
    /// # Errors
    ///
    /// [`ProbError::UndefinedEvent`] for an unknown hypothesis name.
    pub fn prior(&self, hypothesis: &str) -> ProbResult<f64> {
        self.priors
            .get(hypothesis)
            .copied()
            .ok_or_else(|| ProbError::UndefinedEvent(hypothesis.to_string()))
    }

    /// Hypotheses with their priors, in insertion order.
    pub fn priors(&self) -> impl Iterator<Item = (&str, f64)> {
        self.priors.iter().map(|(name, p)| (name.as_str(), *p))
    }

    /// `P(evidence|hypothesis)` if defined.
    pub fn likelihood(&self, hypothesis: &str, evidence: &str) -> Option<f64> {
        self.likelihoods
            .get(hypothesis)
            .and_then(|row| row.get(evidence))
            .copied()
    }

    /// `P(E) = Σ_h P(E|h) · P(h)` over hypotheses defining `P(E|h)`; 0 if none does.
    pub fn total_probability_of_evidence(&self, evidence: &str) -> f64 {
        self.terms(evidence).map(|(_, prior, lik)| prior * lik).sum()
    }

    /// [`Self::total_probability_of_evidence`] with its individual terms.
    pub fn evidence_breakdown(&self, evidence: &str) -> EvidenceProbability {
        let contributions: Vec<EvidenceContribution> = self
            .terms(evidence)
            .map(|(hypothesis, prior, likelihood)| EvidenceContribution {
                hypothesis: hypothesis.to_string(),
                prior,
                likelihood,
                joint: prior * likelihood,
            })
            .collect();
        EvidenceProbability {
            evidence: evidence.to_string(),
            probability: contributions.iter().map(|c| c.joint).sum(),
            contributions,
        }
    }

    /// Posterior `P(h|E)` for every hypothesis defining `P(E|h)`.
    ///
    /// # Errors
    ///
    /// [`ProbError::ZeroEvidenceProbability`] if `P(E) = 0`. Other evidence keys
    /// are unaffected.
    pub fn compute_posterior(&self, evidence: &str) -> ProbResult<PosteriorResult> {
        let breakdown = self.evidence_breakdown(evidence);
        let p_evidence = breakdown.probability;
        if p_evidence <= 0.0 || !p_evidence.is_finite() {
            return Err(ProbError::ZeroEvidenceProbability(evidence.to_string()));
        }

        let records: Vec<PosteriorRecord> = breakdown
            .contributions
            .into_iter()
            .map(|c| {
                let posterior = c.joint / p_evidence;
                PosteriorRecord {
                    prior_fraction: Fraction::approximate(c.prior, PRIOR_FRACTION_MAX_DENOMINATOR),
                    posterior_fraction: Fraction::approximate(
                        posterior,
                        self.config.fraction_max_denominator,
                    ),
                    posterior_percentage: round_to(
                        posterior * 100.0,
                        self.config.percentage_decimals,
                    ),
                    hypothesis: c.hypothesis,
                    prior: c.prior,
                    likelihood: c.likelihood,
                    numerator: c.joint,
                    posterior,
                }
            })
            .collect();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            evidence,
            p_evidence,
            hypotheses = records.len(),
            "posterior computed"
        );

        Ok(PosteriorResult {
            evidence: evidence.to_string(),
            evidence_probability: p_evidence,
            total_numerator: records.iter().map(|r| r.numerator).sum(),
            total_posterior: records.iter().map(|r| r.posterior).sum(),
            records,
        })
    }

    /// Percent change from prior to posterior for every hypothesis in the
    /// posterior, with its qualitative band.
    pub fn compare_to_prior(&self, evidence: &str) -> ProbResult<Vec<ChangeRecord>> {
        let posterior = self.compute_posterior(evidence)?;
        Ok(compare(&posterior))
    }

    /// Posterior, comparison and extremes for one evidence.
    pub fn analyze(&self, evidence: &str) -> ProbResult<BayesAnalysis> {
        let posterior = self.compute_posterior(evidence)?;
        let comparisons = compare(&posterior);

        let most_probable = first_extreme(&posterior.records, |r| r.posterior, |a, b| a > b)
            .cloned()
            .ok_or_else(|| ProbError::Internal("posterior without records".into()))?;
        let least_probable = first_extreme(&posterior.records, |r| r.posterior, |a, b| a < b)
            .cloned()
            .ok_or_else(|| ProbError::Internal("posterior without records".into()))?;

        let defined: Vec<&ChangeRecord> = comparisons
            .iter()
            .filter(|c| c.percent_change.is_some())
            .collect();
        let pct = |c: &&ChangeRecord| c.percent_change.unwrap_or(0.0);
        let largest_increase = first_extreme(&defined, pct, |a, b| a > b).map(|c| (*c).clone());
        let largest_decrease = first_extreme(&defined, pct, |a, b| a < b).map(|c| (*c).clone());

        Ok(BayesAnalysis {
            evidence: evidence.to_string(),
            evidence_probability: posterior.evidence_probability,
            most_probable,
            least_probable,
            largest_increase,
            largest_decrease,
            posterior,
            comparisons,
        })
    }

    /// The maximum-a-posteriori hypothesis for `evidence`. Ties go to the
    /// hypothesis inserted first.
    pub fn classify(&self, evidence: &str) -> ProbResult<Classification> {
        let posterior = self.compute_posterior(evidence)?;
        let best = first_extreme(&posterior.records, |r| r.posterior, |a, b| a > b)
            .ok_or_else(|| ProbError::Internal("posterior without records".into()))?;
        Ok(Classification {
            evidence: evidence.to_string(),
            hypothesis: best.hypothesis.clone(),
            confidence: best.posterior,
        })
    }

    fn terms<'a>(&'a self, evidence: &'a str) -> impl Iterator<Item = (&'a str, f64, f64)> + 'a {
        self.priors.iter().filter_map(move |(hypothesis, prior)| {
            self.likelihood(hypothesis, evidence)
                .map(|likelihood| (hypothesis.as_str(), *prior, likelihood))
        })
    }
}

fn compare(posterior: &PosteriorResult) -> Vec<ChangeRecord> {
    posterior
        .records
        .iter()
        .map(|r| {
            let absolute_change = r.posterior - r.prior;
            let percent_change = (r.prior > 0.0).then(|| absolute_change / r.prior * 100.0);
            ChangeRecord {
                hypothesis: r.hypothesis.clone(),
                prior: r.prior,
                posterior: r.posterior,
                absolute_change,
                percent_change,
                band: percent_change.map(ChangeBand::from_percent_change),
            }
        })
        .collect()
}

/// First element whose key wins every strict comparison, so ties keep insertion order.
fn first_extreme<T>(
    items: &[T],
    key: impl Fn(&T) -> f64,
    wins: impl Fn(f64, f64) -> bool,
) -> Option<&T> {
    let mut best: Option<(&T, f64)> = None;
    for item in items {
        let k = key(item);
        match best {
            Some((_, current)) if !wins(k, current) => {}
            _ => best = Some((item, k)),
        }
    }
    best.map(|(item, _)| item)
}

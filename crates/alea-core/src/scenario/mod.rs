//! Declarative scenarios.
//!
//! A [`Scenario`] bundles a sample space, events, event queries, a Bayes setup
//! and a probability tree into one serializable document, so a whole exercise
//! can live in a file. Outcomes are strings; product spaces join coordinates
//! with a separator (`"3,4"` for two dice by default).
//!
//! ```json
//! {
//!   "sample_space": { "product": [["1","2","3","4","5","6"], ["1","2","3","4","5","6"]] },
//!   "events": { "Sum7": ["1,6", "2,5", "3,4", "4,3", "5,2", "6,1"] },
//!   "queries": [{ "kind": "probability", "event": "Sum7" }],
//!   "bayes": {
//!     "priors": { "Sick": 0.01, "Healthy": 0.99 },
//!     "likelihoods": { "Sick": { "Positive": 0.95 }, "Healthy": { "Positive": 0.10 } },
//!     "evidence": ["Positive"]
//!   },
//!   "tree": [0.6, 0.7, 0.5]
//! }
//! ```
//!
//! Structural problems (events outside Ω, invalid priors, unknown hypotheses,
//! bad configuration) abort the run. Query-level failures such as conditioning
//! on an impossible event are recorded next to the query and the run continues.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::engine::algebra::{
    AlgebraConfig, ComplementProbability, ConditionalProbability, EventAlgebra, EventProbability,
    IndependenceCheck, IndependentJoint, SpaceSummary, UnionProbability,
};
use crate::engine::bayes::{BayesAnalysis, BayesConfig, BayesEngine, BayesState};
use crate::engine::errors::{ProbError, ProbResult};
use crate::engine::space::ProbabilitySpace;
use crate::engine::tree::{ProbabilityTree, TreePath};

fn default_separator() -> String {
    ",".to_string()
}

/// How Ω is given in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleSpaceDef {
    /// Explicit outcome list.
    Outcomes { outcomes: Vec<String> },
    /// Cartesian product of factors, coordinates joined by `separator`.
    Product {
        product: Vec<Vec<String>>,
        #[serde(default = "default_separator")]
        separator: String,
    },
}

/// One event-algebra question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventQuery {
    Probability { event: String },
    Union { a: String, b: String },
    Intersection { a: String, b: String },
    MutuallyExclusive { a: String, b: String },
    Complement { event: String },
    Conditional { event: String, given: String },
    Independence { a: String, b: String },
    AssumeIndependent { a: String, b: String },
    Summary,
}

/// Priors, likelihoods and the evidence names to analyze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesDef {
    pub priors: IndexMap<String, f64>,
    #[serde(default)]
    pub likelihoods: IndexMap<String, IndexMap<String, f64>>,
    #[serde(default)]
    pub evidence: Vec<String>,
}

/// Configuration overrides carried by a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub algebra: AlgebraConfig,
    pub bayes: BayesConfig,
}

/// A complete exercise.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sample_space: Option<SampleSpaceDef>,
    #[serde(default)]
    pub events: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub queries: Vec<EventQuery>,
    #[serde(default)]
    pub bayes: Option<BayesDef>,
    #[serde(default)]
    pub tree: Option<Vec<f64>>,
    #[serde(default)]
    pub config: ScenarioConfig,
}

/// The answer to an [`EventQuery`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryAnswer {
    Probability(EventProbability<String>),
    Union(UnionProbability<String>),
    Intersection { outcomes: Vec<String> },
    MutuallyExclusive { exclusive: bool },
    Complement(ComplementProbability<String>),
    Conditional(ConditionalProbability<String>),
    Independence(IndependenceCheck),
    AssumeIndependent(IndependentJoint),
    Summary(SpaceSummary<String>),
}

/// A query together with its answer or the error it raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub query: EventQuery,
    pub answer: Option<QueryAnswer>,
    pub error: Option<String>,
}

/// Bayesian analysis of one evidence name, or the error it raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceOutcome {
    pub evidence: String,
    pub analysis: Option<BayesAnalysis>,
    pub error: Option<String>,
}

/// Enumerated probability tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeReport {
    pub levels: Vec<f64>,
    pub paths: Vec<TreePath>,
    pub successes: Vec<f64>,
}

/// Everything a scenario run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub name: Option<String>,
    pub summary: Option<SpaceSummary<String>>,
    pub queries: Vec<QueryOutcome>,
    pub bayes_state: Option<BayesState>,
    pub evidence: Vec<EvidenceOutcome>,
    pub tree: Option<TreeReport>,
}

impl Scenario {
    /// Builds the probability space described by the scenario.
    pub fn build_space(&self) -> ProbResult<ProbabilitySpace<String>> {
        let mut space = match &self.sample_space {
            None => ProbabilitySpace::new(),
            Some(SampleSpaceDef::Outcomes { outcomes }) => {
                ProbabilitySpace::with_outcomes(outcomes.iter().cloned())?
            }
            Some(SampleSpaceDef::Product { product, separator }) => {
                let tuples = ProbabilitySpace::product(product.iter().cloned())?;
                let joined = ProbabilitySpace::with_outcomes(
                    tuples.outcomes().iter().map(|tuple| tuple.join(separator.as_str())),
                )?;
                // Distinct tuples must stay distinct once joined.
                if joined.cardinality() != tuples.cardinality() {
                    return Err(ProbError::ValidationError(format!(
                        "product coordinates joined with separator {:?} collide: {} tuples map to {} outcomes",
                        separator,
                        tuples.cardinality(),
                        joined.cardinality()
                    )));
                }
                joined
            }
        };
        for (name, outcomes) in &self.events {
            space.define_event(name.clone(), outcomes.iter().cloned())?;
        }
        Ok(space)
    }

    /// Builds the Bayes engine, or `None` when the scenario has no Bayes section.
    pub fn build_engine(&self) -> ProbResult<Option<BayesEngine>> {
        let Some(def) = &self.bayes else {
            return Ok(None);
        };
        let mut engine = BayesEngine::with_config(self.config.bayes)?;
        engine.set_priors(def.priors.iter().map(|(h, p)| (h.clone(), *p)))?;
        if !def.likelihoods.is_empty() {
            engine.set_likelihoods(def.likelihoods.iter().map(|(h, row)| {
                (
                    h.clone(),
                    row.iter().map(|(e, v)| (e.clone(), *v)).collect::<Vec<_>>(),
                )
            }))?;
        }
        Ok(Some(engine))
    }

    /// Runs every section of the scenario.
    pub fn run(&self) -> ProbResult<ScenarioReport> {
        let space = self.build_space()?;
        let algebra = EventAlgebra::with_config(&space, self.config.algebra)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            scenario = self.name.as_deref().unwrap_or("<unnamed>"),
            outcomes = space.cardinality(),
            queries = self.queries.len(),
            "running scenario"
        );

        let queries = self
            .queries
            .iter()
            .map(|query| match answer(&algebra, query) {
                Ok(answer) => QueryOutcome {
                    query: query.clone(),
                    answer: Some(answer),
                    error: None,
                },
                Err(err) => QueryOutcome {
                    query: query.clone(),
                    answer: None,
                    error: Some(err.to_string()),
                },
            })
            .collect();

        let engine = self.build_engine()?;
        let evidence = match (&engine, &self.bayes) {
            (Some(engine), Some(def)) => def
                .evidence
                .iter()
                .map(|evidence| match engine.analyze(evidence) {
                    Ok(analysis) => EvidenceOutcome {
                        evidence: evidence.clone(),
                        analysis: Some(analysis),
                        error: None,
                    },
                    Err(err) => EvidenceOutcome {
                        evidence: evidence.clone(),
                        analysis: None,
                        error: Some(err.to_string()),
                    },
                })
                .collect(),
            _ => Vec::new(),
        };

        let tree = match &self.tree {
            Some(levels) => {
                let tree = ProbabilityTree::new(levels.clone())?;
                Some(TreeReport {
                    levels: tree.levels().to_vec(),
                    paths: tree.paths(),
                    successes: tree.successes_distribution(),
                })
            }
            None => None,
        };

        Ok(ScenarioReport {
            name: self.name.clone(),
            summary: space.is_defined().then(|| algebra.summary()),
            queries,
            bayes_state: engine.as_ref().map(BayesEngine::state),
            evidence,
            tree,
        })
    }

    /// Checks the scenario without running queries.
    pub fn validate(&self) -> ProbResult<()> {
        self.config.algebra.validate()?;
        self.config.bayes.validate()?;
        self.build_space()?;
        self.build_engine()?;
        if let Some(levels) = &self.tree {
            ProbabilityTree::new(levels.clone())?;
        }
        if self.sample_space.is_none() && !self.queries.is_empty() {
            return Err(ProbError::ValidationError(
                "queries require a sample_space".into(),
            ));
        }
        Ok(())
    }
}

fn answer(algebra: &EventAlgebra<'_, String>, query: &EventQuery) -> ProbResult<QueryAnswer> {
    Ok(match query {
        EventQuery::Probability { event } => QueryAnswer::Probability(algebra.probability_of(event)?),
        EventQuery::Union { a, b } => QueryAnswer::Union(algebra.probability_of_union(a, b)?),
        EventQuery::Intersection { a, b } => QueryAnswer::Intersection {
            outcomes: algebra.intersection_of(a, b)?.into_iter().collect(),
        },
        EventQuery::MutuallyExclusive { a, b } => QueryAnswer::MutuallyExclusive {
            exclusive: algebra.are_mutually_exclusive(a, b)?,
        },
        EventQuery::Complement { event } => {
            QueryAnswer::Complement(algebra.probability_of_complement(event)?)
        }
        EventQuery::Conditional { event, given } => {
            QueryAnswer::Conditional(algebra.probability_of_conditional(event, given)?)
        }
        EventQuery::Independence { a, b } => QueryAnswer::Independence(algebra.independence(a, b)?),
        EventQuery::AssumeIndependent { a, b } => {
            QueryAnswer::AssumeIndependent(algebra.probability_assuming_independence(a, b)?)
        }
        EventQuery::Summary => QueryAnswer::Summary(algebra.summary()),
    })
}

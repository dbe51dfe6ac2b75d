//! Scenario documents parsed from JSON and run end to end.

use alea_core::scenario::{QueryAnswer, Scenario};
use alea_core::{BayesState, Fraction, ProbError};

const DICE_AND_MEDICAL: &str = r#"{
    "name": "dice and diagnosis",
    "sample_space": {
        "product": [["1","2","3","4","5","6"], ["1","2","3","4","5","6"]]
    },
    "events": {
        "Sum7": ["1,6", "2,5", "3,4", "4,3", "5,2", "6,1"],
        "First6": ["6,1", "6,2", "6,3", "6,4", "6,5", "6,6"],
        "Never": []
    },
    "queries": [
        { "kind": "probability", "event": "Sum7" },
        { "kind": "union", "a": "Sum7", "b": "First6" },
        { "kind": "independence", "a": "Sum7", "b": "First6" },
        { "kind": "conditional", "event": "Sum7", "given": "Never" },
        { "kind": "summary" }
    ],
    "bayes": {
        "priors": { "Sick": 0.01, "Healthy": 0.99 },
        "likelihoods": {
            "Sick": { "Positive": 0.95, "Negative": 0.05 },
            "Healthy": { "Positive": 0.10, "Negative": 0.90 }
        },
        "evidence": ["Positive", "Inconclusive"]
    },
    "tree": [0.6, 0.7, 0.5]
}"#;

fn parse(source: &str) -> Scenario {
    serde_json::from_str(source).expect("scenario parses")
}

#[test]
fn dice_and_medical_scenario_runs() {
    let report = parse(DICE_AND_MEDICAL).run().unwrap();
    assert_eq!(report.name.as_deref(), Some("dice and diagnosis"));

    let summary = report.summary.as_ref().unwrap();
    assert_eq!(summary.cardinality, 36);
    assert_eq!(summary.events.len(), 3);

    match report.queries[0].answer.as_ref().unwrap() {
        QueryAnswer::Probability(p) => {
            assert_eq!(p.result.fraction, Fraction::new(1, 6).unwrap())
        }
        other => panic!("unexpected answer {:?}", other),
    }
    match report.queries[1].answer.as_ref().unwrap() {
        QueryAnswer::Union(u) => assert_eq!(u.union.fraction, Fraction::new(11, 36).unwrap()),
        other => panic!("unexpected answer {:?}", other),
    }
    assert!(report.queries[3].answer.is_none());
    assert!(report.queries[3].error.is_some());

    assert_eq!(report.bayes_state, Some(BayesState::Ready));
    let positive = report.evidence[0].analysis.as_ref().unwrap();
    let sick = positive.posterior.get("Sick").unwrap();
    assert_eq!(sick.posterior_percentage, 8.76);
    assert!(report.evidence[1].analysis.is_none());

    let tree = report.tree.as_ref().unwrap();
    assert_eq!(tree.paths.len(), 8);
    assert_eq!(tree.successes.len(), 4);
}

#[test]
fn report_serializes_to_json() {
    let report = parse(DICE_AND_MEDICAL).run().unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["queries"][0]["answer"]["kind"], "probability");
    assert_eq!(
        json["evidence"][0]["analysis"]["comparisons"][0]["band"],
        "very_significant_increase"
    );
    assert_eq!(json["tree"]["paths"][0]["branches"][0], "success");
}

#[test]
fn priors_keep_file_order() {
    let scenario = parse(DICE_AND_MEDICAL);
    let engine = scenario.build_engine().unwrap().unwrap();
    let names: Vec<&str> = engine.priors().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["Sick", "Healthy"]);
}

#[test]
fn invalid_priors_abort_the_scenario() {
    let scenario = parse(
        r#"{ "bayes": { "priors": { "A": 0.3, "B": 0.3 } } }"#,
    );
    assert!(matches!(scenario.run(), Err(ProbError::InvalidPrior(_))));
}

#[test]
fn config_overrides_are_validated() {
    let scenario = parse(
        r#"{
            "sample_space": { "outcomes": ["a", "b"] },
            "config": { "algebra": { "independence_tolerance": -1.0 } }
        }"#,
    );
    assert!(matches!(
        scenario.run(),
        Err(ProbError::ValidationError(_))
    ));
}

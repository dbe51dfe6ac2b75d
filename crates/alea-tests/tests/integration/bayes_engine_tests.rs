//! Bayes engine tests for the classic diagnostic and spam-filter setups.

use alea_core::engine::bayes::BayesState;
use alea_core::{BayesEngine, ChangeBand, ProbError};

fn spam_filter() -> BayesEngine {
    let mut engine = BayesEngine::new();
    engine.set_priors([("Spam", 0.30), ("NotSpam", 0.70)]).unwrap();
    engine
        .set_likelihoods([
            (
                "Spam",
                vec![("free", 0.80), ("offer", 0.60), ("job", 0.20), ("meeting", 0.05)],
            ),
            (
                "NotSpam",
                vec![("free", 0.10), ("offer", 0.15), ("job", 0.40), ("meeting", 0.30)],
            ),
        ])
        .unwrap();
    engine
}

#[test]
fn spam_filter_classifies_keywords() {
    let engine = spam_filter();
    assert_eq!(engine.state(), BayesState::Ready);

    let free = engine.classify("free").unwrap();
    assert_eq!(free.hypothesis, "Spam");
    // 0.24 / (0.24 + 0.07)
    assert!((free.confidence - 0.24 / 0.31).abs() < 1e-12);

    let meeting = engine.classify("meeting").unwrap();
    assert_eq!(meeting.hypothesis, "NotSpam");
    assert!((meeting.confidence - 0.21 / 0.225).abs() < 1e-12);
}

#[test]
fn spam_filter_change_bands() {
    let engine = spam_filter();
    let changes = engine.compare_to_prior("offer").unwrap();
    // P(offer) = 0.18 + 0.105 = 0.285; P(Spam|offer) ≈ 0.6316 (+110%)
    assert_eq!(changes[0].hypothesis, "Spam");
    assert_eq!(changes[0].band, Some(ChangeBand::VerySignificantIncrease));
    // P(NotSpam|offer) ≈ 0.3684 (-47.4%)
    assert_eq!(changes[1].band, Some(ChangeBand::SignificantDecrease));
}

#[test]
fn posterior_is_idempotent() {
    let engine = spam_filter();
    let first = engine.compute_posterior("job").unwrap();
    let second = engine.compute_posterior("job").unwrap();
    assert_eq!(first, second);
}

#[test]
fn replacing_priors_invalidates_previous_results() {
    let mut engine = spam_filter();
    let before = engine.compute_posterior("free").unwrap();

    engine.set_priors([("Spam", 0.5), ("NotSpam", 0.5)]).unwrap();
    assert_eq!(
        engine.compute_posterior("free").unwrap_err(),
        ProbError::ZeroEvidenceProbability("free".into())
    );

    engine
        .set_likelihoods([
            ("Spam", vec![("free", 0.80)]),
            ("NotSpam", vec![("free", 0.10)]),
        ])
        .unwrap();
    let after = engine.compute_posterior("free").unwrap();
    assert!((after.get("Spam").unwrap().posterior - 0.4 / 0.45).abs() < 1e-12);
    assert_ne!(before, after);
}

#[test]
fn replacing_likelihoods_changes_posterior() {
    let mut engine = spam_filter();
    let before = engine.compute_posterior("free").unwrap();
    engine
        .set_likelihoods([
            ("Spam", vec![("free", 0.50)]),
            ("NotSpam", vec![("free", 0.50)]),
        ])
        .unwrap();
    let after = engine.compute_posterior("free").unwrap();
    assert_ne!(before, after);
    assert!((after.get("Spam").unwrap().posterior - 0.30).abs() < 1e-12);
}

#[test]
fn unknown_hypothesis_lookup_is_undefined() {
    let engine = spam_filter();
    assert_eq!(
        engine.prior("Phishing").unwrap_err(),
        ProbError::UndefinedEvent("Phishing".into())
    );
}

#[test]
fn evidence_breakdown_lists_terms_in_order() {
    let engine = spam_filter();
    let breakdown = engine.evidence_breakdown("job");
    let names: Vec<&str> = breakdown
        .contributions
        .iter()
        .map(|c| c.hypothesis.as_str())
        .collect();
    assert_eq!(names, vec!["Spam", "NotSpam"]);
    assert!((breakdown.probability - 0.34).abs() < 1e-12);
}

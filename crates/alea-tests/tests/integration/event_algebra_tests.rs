//! Event-algebra tests over the two-dice sample space.

use alea_core::engine::algebra::{FORMULA_UNION_EXCLUSIVE, FORMULA_UNION_GENERAL};
use alea_core::{Fraction, ProbError, ProbabilitySpace};

fn two_dice() -> ProbabilitySpace<(u8, u8)> {
    let outcomes = (1..=6).flat_map(|i| (1..=6).map(move |j| (i, j)));
    let mut space = ProbabilitySpace::with_outcomes(outcomes).unwrap();
    space
        .define_event_where("Sum7", |(i, j)| i + j == 7)
        .unwrap();
    space
        .define_event_where("SumEven", |(i, j)| (i + j) % 2 == 0)
        .unwrap();
    space
        .define_event("First6", (1..=6).map(|j| (6, j)))
        .unwrap();
    space
        .define_event_where("Doubles", |(i, j)| i == j)
        .unwrap();
    space
}

#[test]
fn dice_sum_seven_is_one_sixth() {
    let space = two_dice();
    assert_eq!(space.cardinality(), 36);

    let p = space.algebra().probability_of("Sum7").unwrap();
    assert_eq!(p.cardinality, 6);
    assert_eq!(p.result.fraction, Fraction::new(1, 6).unwrap());
    assert_eq!(p.result.fraction.to_string(), "1/6");
    assert_eq!(p.result.probability, 0.1667);
    assert_eq!(p.result.percentage, 16.67);
}

#[test]
fn sum_seven_and_doubles_are_exclusive() {
    let space = two_dice();
    let algebra = space.algebra();
    assert!(algebra.are_mutually_exclusive("Sum7", "Doubles").unwrap());

    let union = algebra.probability_of_union("Sum7", "Doubles").unwrap();
    assert_eq!(union.union.formula, FORMULA_UNION_EXCLUSIVE);
    assert_eq!(union.union.fraction, Fraction::new(1, 3).unwrap());
}

#[test]
fn sum_seven_and_first_six_overlap_but_are_independent() {
    let space = two_dice();
    let algebra = space.algebra();
    assert!(!algebra.are_mutually_exclusive("Sum7", "First6").unwrap());
    assert!(algebra.are_independent("Sum7", "First6").unwrap());

    let union = algebra.probability_of_union("Sum7", "First6").unwrap();
    assert_eq!(union.union.formula, FORMULA_UNION_GENERAL);
    assert_eq!(union.intersection_outcomes, vec![(6, 1)]);
    // 6/36 + 6/36 - 1/36
    assert_eq!(union.union.fraction, Fraction::new(11, 36).unwrap());
}

#[test]
fn doubles_given_even_sum() {
    let space = two_dice();
    let c = space
        .algebra()
        .probability_of_conditional("Doubles", "SumEven")
        .unwrap();
    // 6 doubles among 18 even sums
    assert_eq!(c.conditional.fraction, Fraction::new(1, 3).unwrap());
    assert_eq!(c.intersection_outcomes.len(), 6);
}

#[test]
fn doubles_and_even_sum_are_dependent() {
    let space = two_dice();
    let check = space.algebra().independence("Doubles", "SumEven").unwrap();
    assert!(!check.independent);
    // P(D ∩ E) = 1/6, P(D)·P(E) = 1/12
    assert!((check.difference - 1.0 / 12.0).abs() < 1e-12);
}

#[test]
fn complement_of_sum_seven() {
    let space = two_dice();
    let c = space.algebra().probability_of_complement("Sum7").unwrap();
    assert_eq!(c.cardinality, 30);
    assert_eq!(c.complement.fraction, Fraction::new(5, 6).unwrap());
    assert!(!c.outcomes.contains(&(3, 4)));
}

#[test]
fn conditioning_on_empty_event_fails() {
    let mut space = two_dice();
    space.define_event_where("Sum13", |(i, j)| i + j == 13).unwrap();
    let err = space
        .algebra()
        .probability_of_conditional("Sum7", "Sum13")
        .unwrap_err();
    assert!(matches!(err, ProbError::DivisionByZero { .. }));
}

#[test]
fn events_outside_space_are_rejected() {
    let mut space = two_dice();
    let err = space.define_event("Seven", [(7, 1)]).unwrap_err();
    assert!(matches!(err, ProbError::InvalidEvent { .. }));
}

#[test]
fn summary_reflects_redefinitions() {
    let mut space = two_dice();
    space.define_event("Sum7", [(1, 6)]).unwrap();
    let summary = space.algebra().summary();
    let sum7 = summary.events.iter().find(|e| e.event == "Sum7").unwrap();
    assert_eq!(sum7.cardinality, 1);
    assert_eq!(sum7.result.fraction, Fraction::new(1, 36).unwrap());
    assert_eq!(summary.events.len(), 4);
}

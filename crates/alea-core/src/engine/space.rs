//! Sample spaces and the named-event registry.
//!
//! A [`ProbabilitySpace`] owns the universe of outcomes (Ω) and every event
//! registered against it. Outcomes are opaque: any `Ord + Clone` type works, from
//! strings to tuples such as `(u8, u8)` for two dice.
//!
//! Events are validated eagerly against Ω when they are defined. Queries over
//! registered events live in [`crate::engine::algebra`].

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::engine::algebra::{AlgebraConfig, EventAlgebra};
use crate::engine::errors::{ProbError, ProbResult};

/// A named subset of the sample space.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Event<T> {
    pub name: String,
    pub outcomes: BTreeSet<T>,
}

impl<T: Ord> Event<T> {
    pub fn cardinality(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// A finite sample space together with its registry of named events.
///
/// Events keep their registration order, which is also the order reported by
/// [`EventAlgebra::summary`]. Redefining an event replaces its outcomes in place.
#[derive(Debug, Clone)]
pub struct ProbabilitySpace<T> {
    outcomes: BTreeSet<T>,
    events: IndexMap<String, Event<T>>,
}

impl<T> Default for ProbabilitySpace<T> {
    fn default() -> Self {
        Self {
            outcomes: BTreeSet::new(),
            events: IndexMap::new(),
        }
    }
}

impl<T: Ord + Clone> ProbabilitySpace<T> {
    /// Creates an empty space with no outcomes and no events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a space over the given outcomes.
    pub fn with_outcomes(outcomes: impl IntoIterator<Item = T>) -> ProbResult<Self> {
        let mut space = Self::new();
        space.define_sample_space(outcomes)?;
        Ok(space)
    }

    /// Defines Ω, deduplicating the outcomes.
    ///
    /// Replaces any previous sample space. Events registered against the old space
    /// are dropped, since their subset invariant was only checked against it.
    ///
    /// # Errors
    ///
    /// [`ProbError::EmptySampleSpace`] if `outcomes` is empty; the current space
    /// is left unchanged.
    pub fn define_sample_space(
        &mut self,
        outcomes: impl IntoIterator<Item = T>,
    ) -> ProbResult<&BTreeSet<T>> {
        let outcomes: BTreeSet<T> = outcomes.into_iter().collect();
        if outcomes.is_empty() {
            return Err(ProbError::EmptySampleSpace);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            outcomes = outcomes.len(),
            dropped_events = self.events.len(),
            "sample space defined"
        );

        self.outcomes = outcomes;
        self.events.clear();
        Ok(&self.outcomes)
    }

    /// Registers (or overwrites) the event `name`.
    ///
    /// # Errors
    ///
    /// [`ProbError::InvalidEvent`] if any outcome lies outside Ω. The registry is
    /// left unchanged in that case.
    pub fn define_event(
        &mut self,
        name: impl Into<String>,
        outcomes: impl IntoIterator<Item = T>,
    ) -> ProbResult<&Event<T>> {
        let name = name.into();
        let outcomes: BTreeSet<T> = outcomes.into_iter().collect();
        let outside = outcomes.difference(&self.outcomes).count();
        if outside > 0 {
            return Err(ProbError::InvalidEvent { name, outside });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            event = %name,
            cardinality = outcomes.len(),
            replaced = self.events.contains_key(&name),
            "event defined"
        );

        let event = Event {
            name: name.clone(),
            outcomes,
        };
        let (index, _) = self.events.insert_full(name, event);
        self.events
            .get_index(index)
            .map(|(_, event)| event)
            .ok_or_else(|| ProbError::Internal("event vanished after insertion".into()))
    }

    /// Registers an event made of every outcome satisfying `predicate`.
    pub fn define_event_where(
        &mut self,
        name: impl Into<String>,
        predicate: impl Fn(&T) -> bool,
    ) -> ProbResult<&Event<T>> {
        let selected: Vec<T> = self
            .outcomes
            .iter()
            .filter(|outcome| predicate(outcome))
            .cloned()
            .collect();
        self.define_event(name, selected)
    }

    /// Looks up a registered event.
    pub fn event(&self, name: &str) -> ProbResult<&Event<T>> {
        self.events
            .get(name)
            .ok_or_else(|| ProbError::UndefinedEvent(name.to_string()))
    }

    /// Registered events in definition order.
    pub fn events(&self) -> impl Iterator<Item = &Event<T>> {
        self.events.values()
    }

    pub fn outcomes(&self) -> &BTreeSet<T> {
        &self.outcomes
    }

    pub fn cardinality(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_defined(&self) -> bool {
        !self.outcomes.is_empty()
    }

    /// Query view with the default configuration.
    pub fn algebra(&self) -> EventAlgebra<'_, T> {
        EventAlgebra::new(self)
    }

    /// Query view with an explicit configuration.
    pub fn algebra_with_config(&self, config: AlgebraConfig) -> ProbResult<EventAlgebra<'_, T>> {
        EventAlgebra::with_config(self, config)
    }
}

impl<T: Ord + Clone> ProbabilitySpace<Vec<T>> {
    /// Builds Ω as the Cartesian product of `factors`, one coordinate per factor.
    ///
    /// Two dice are `product([1..=6, 1..=6])`; each outcome is the vector of
    /// coordinates in factor order.
    ///
    /// # Errors
    ///
    /// [`ProbError::EmptySampleSpace`] if there are no factors or any factor is empty.
    pub fn product<I, F>(factors: I) -> ProbResult<Self>
    where
        I: IntoIterator<Item = F>,
        F: IntoIterator<Item = T>,
    {
        let factors: Vec<Vec<T>> = factors
            .into_iter()
            .map(|factor| {
                let unique: BTreeSet<T> = factor.into_iter().collect();
                unique.into_iter().collect()
            })
            .collect();
        if factors.is_empty() {
            return Err(ProbError::EmptySampleSpace);
        }

        let mut tuples: Vec<Vec<T>> = vec![Vec::with_capacity(factors.len())];
        for factor in &factors {
            let mut next = Vec::with_capacity(tuples.len() * factor.len());
            for prefix in &tuples {
                for value in factor {
                    let mut tuple = prefix.clone();
                    tuple.push(value.clone());
                    next.push(tuple);
                }
            }
            tuples = next;
        }

        Self::with_outcomes(tuples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin_space() -> ProbabilitySpace<&'static str> {
        ProbabilitySpace::with_outcomes(["H", "T"]).unwrap()
    }

    #[test]
    fn define_sample_space_deduplicates() {
        let mut space = ProbabilitySpace::new();
        let outcomes = space.define_sample_space([3, 1, 3, 2, 1]).unwrap();
        assert_eq!(outcomes.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(space.cardinality(), 3);
    }

    #[test]
    fn empty_sample_space_is_rejected_and_previous_space_kept() {
        let mut space = coin_space();
        let err = space.define_sample_space(Vec::<&str>::new()).unwrap_err();
        assert_eq!(err, ProbError::EmptySampleSpace);
        assert_eq!(space.cardinality(), 2);
    }

    #[test]
    fn redefining_sample_space_drops_events() {
        let mut space = coin_space();
        space.define_event("Heads", ["H"]).unwrap();
        space.define_sample_space(["1", "2"]).unwrap();
        assert_eq!(space.events().count(), 0);
        assert!(matches!(
            space.event("Heads"),
            Err(ProbError::UndefinedEvent(name)) if name == "Heads"
        ));
    }

    #[test]
    fn define_event_rejects_outcomes_outside_space() {
        let mut space = coin_space();
        let err = space.define_event("Edge", ["H", "E", "X"]).unwrap_err();
        assert_eq!(
            err,
            ProbError::InvalidEvent {
                name: "Edge".into(),
                outside: 2
            }
        );
        assert!(space.event("Edge").is_err());
    }

    #[test]
    fn redefining_event_overwrites_in_place() {
        let mut space = coin_space();
        space.define_event("A", ["H"]).unwrap();
        space.define_event("B", ["T"]).unwrap();
        let redefined = space.define_event("A", ["H", "T", "H"]).unwrap();
        assert_eq!(redefined.cardinality(), 2);

        let names: Vec<&str> = space.events().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn define_event_where_filters_outcomes() {
        let mut space = ProbabilitySpace::with_outcomes(1..=10).unwrap();
        let even = space.define_event_where("Even", |n| n % 2 == 0).unwrap();
        assert_eq!(even.cardinality(), 5);
    }

    #[test]
    fn product_builds_cartesian_space() {
        let dice = ProbabilitySpace::product([1..=6, 1..=6]).unwrap();
        assert_eq!(dice.cardinality(), 36);
        assert!(dice.outcomes().contains(&vec![3, 4]));

        let err = ProbabilitySpace::<Vec<u8>>::product(Vec::<Vec<u8>>::new()).unwrap_err();
        assert_eq!(err, ProbError::EmptySampleSpace);
        let err = ProbabilitySpace::product([vec![1], vec![]]).unwrap_err();
        assert_eq!(err, ProbError::EmptySampleSpace);
    }
}

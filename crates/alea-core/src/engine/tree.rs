//! Probability trees for sequences of independent binary trials.
//!
//! Level `i` of the tree splits every node into a success branch with probability
//! `p_i` and a failure branch with probability `1 - p_i`. A root-to-leaf path has
//! the product of its branch probabilities, and the leaves partition the space.

use std::fmt;

use smallvec::SmallVec;

use crate::engine::errors::{ProbError, ProbResult};

/// Trees with more levels would enumerate over a million leaves.
pub const MAX_TREE_LEVELS: usize = 20;

/// Outcome of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Branch {
    Success,
    Failure,
}

/// One root-to-leaf path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TreePath {
    pub branches: SmallVec<[Branch; 8]>,
    pub probability: f64,
}

impl TreePath {
    pub fn successes(&self) -> usize {
        self.branches
            .iter()
            .filter(|b| **b == Branch::Success)
            .count()
    }
}

/// Renders as `E1 F2 E3`: `E` for success, `F` for failure, numbered by level.
impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, branch) in self.branches.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let tag = match branch {
                Branch::Success => 'E',
                Branch::Failure => 'F',
            };
            write!(f, "{}{}", tag, i + 1)?;
        }
        Ok(())
    }
}

/// A binary probability tree given by its per-level success probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTree {
    levels: Vec<f64>,
}

impl ProbabilityTree {
    /// # Errors
    ///
    /// - [`ProbError::ValidationError`] for zero levels or more than [`MAX_TREE_LEVELS`].
    /// - [`ProbError::InvalidProbability`] if a level probability is outside [0, 1].
    pub fn new(levels: impl Into<Vec<f64>>) -> ProbResult<Self> {
        let levels = levels.into();
        if levels.is_empty() || levels.len() > MAX_TREE_LEVELS {
            return Err(ProbError::ValidationError(format!(
                "probability tree needs between 1 and {} levels, got {}",
                MAX_TREE_LEVELS,
                levels.len()
            )));
        }
        for (i, p) in levels.iter().enumerate() {
            if !p.is_finite() || !(0.0..=1.0).contains(p) {
                return Err(ProbError::InvalidProbability {
                    value: *p,
                    context: format!("tree level {}", i + 1),
                });
            }
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Every leaf, success branches first at each level.
    pub fn paths(&self) -> Vec<TreePath> {
        let mut paths = vec![TreePath {
            branches: SmallVec::new(),
            probability: 1.0,
        }];
        for p in &self.levels {
            let mut next = Vec::with_capacity(paths.len() * 2);
            for path in paths {
                let mut success = path.clone();
                success.branches.push(Branch::Success);
                success.probability *= p;
                next.push(success);

                let mut failure = path;
                failure.branches.push(Branch::Failure);
                failure.probability *= 1.0 - p;
                next.push(failure);
            }
            paths = next;
        }
        paths
    }

    /// Probability of following exactly `branches` from the root.
    ///
    /// # Errors
    ///
    /// [`ProbError::ValidationError`] if `branches` is not one branch per level.
    pub fn path_probability(&self, branches: &[Branch]) -> ProbResult<f64> {
        if branches.len() != self.levels.len() {
            return Err(ProbError::ValidationError(format!(
                "path has {} branches, tree has {} levels",
                branches.len(),
                self.levels.len()
            )));
        }
        Ok(self
            .levels
            .iter()
            .zip(branches)
            .map(|(p, branch)| match branch {
                Branch::Success => *p,
                Branch::Failure => 1.0 - p,
            })
            .product())
    }

    /// `P(k successes)` for `k = 0..=depth`.
    pub fn successes_distribution(&self) -> Vec<f64> {
        let mut dist = vec![0.0; self.levels.len() + 1];
        dist[0] = 1.0;
        for (level, p) in self.levels.iter().enumerate() {
            for k in (0..=level + 1).rev() {
                let stay = dist[k] * (1.0 - p);
                let advance = if k > 0 { dist[k - 1] * p } else { 0.0 };
                dist[k] = stay + advance;
            }
        }
        dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_levels() {
        assert!(matches!(
            ProbabilityTree::new(Vec::new()),
            Err(ProbError::ValidationError(_))
        ));
        assert!(matches!(
            ProbabilityTree::new(vec![0.5; MAX_TREE_LEVELS + 1]),
            Err(ProbError::ValidationError(_))
        ));
        assert!(matches!(
            ProbabilityTree::new(vec![0.2, 1.3]),
            Err(ProbError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn paths_enumerate_success_first() {
        let tree = ProbabilityTree::new(vec![0.6, 0.7, 0.5]).unwrap();
        let paths = tree.paths();
        assert_eq!(paths.len(), 8);
        assert_eq!(paths[0].to_string(), "E1 E2 E3");
        assert_eq!(paths[7].to_string(), "F1 F2 F3");
        assert!((paths[0].probability - 0.21).abs() < 1e-12);
        let total: f64 = paths.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn path_probability_matches_enumeration() {
        let tree = ProbabilityTree::new(vec![0.6, 0.7, 0.5]).unwrap();
        for path in tree.paths() {
            let direct = tree.path_probability(&path.branches).unwrap();
            assert!((direct - path.probability).abs() < 1e-15);
        }
        assert!(tree.path_probability(&[Branch::Success]).is_err());
    }

    #[test]
    fn successes_distribution_is_poisson_binomial() {
        let tree = ProbabilityTree::new(vec![0.6, 0.7, 0.5]).unwrap();
        let dist = tree.successes_distribution();
        assert_eq!(dist.len(), 4);
        // P(0) = 0.4 · 0.3 · 0.5, P(3) = 0.6 · 0.7 · 0.5
        assert!((dist[0] - 0.06).abs() < 1e-12);
        assert!((dist[3] - 0.21).abs() < 1e-12);

        let mut by_paths = [0.0; 4];
        for path in tree.paths() {
            by_paths[path.successes()] += path.probability;
        }
        for k in 0..4 {
            assert!((dist[k] - by_paths[k]).abs() < 1e-12);
        }
    }
}

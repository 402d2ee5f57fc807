//! Diversity estimators decide which members of an overfull front to drop.
//!
//! Every estimator assigns a score to each member of a front, **higher
//! scores are more valuable**, and produces an eviction order: the indices
//! of the members to drop, worst first.

pub mod crowding;
pub mod hypervolume_contribution;
pub mod nearest_neighbor;
pub mod potential;

use itertools::Itertools;

pub use self::{
  crowding::CrowdingDistance,
  hypervolume_contribution::{HypervolumeContribution, ReferencePoint},
  nearest_neighbor::NearestNeighborDistance,
  potential::{ElectrostaticEnergy, IndicatorPotential},
};
use crate::solution::Evaluated;

/// Scores members of a front by how much they contribute to its diversity.
pub trait DiversityEstimator {
  /// Returns one score per member of `front`, aligned with it. Higher is
  /// more valuable.
  fn score<S: Evaluated>(&self, front: &[S]) -> Vec<f64>;

  /// Returns the indices of `count` members of `front` to evict, in
  /// eviction order. Fewer indices are returned if `front` is smaller than
  /// `count`.
  ///
  /// By default, scores are recomputed from scratch on the remaining
  /// members after each eviction and the member with the lowest score is
  /// evicted. Ties go to the member with the lowest index.
  fn eviction_order<S: Evaluated>(
    &self,
    front: &[S],
    count: usize,
  ) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..front.len()).collect();
    let mut order = Vec::with_capacity(count.min(front.len()));
    while order.len() < count {
      let view: Vec<&S> = remaining.iter().map(|&idx| &front[idx]).collect();
      let Some(worst) = self
        .score(&view)
        .iter()
        .position_min_by(|a, b| a.total_cmp(b))
      else {
        break;
      };
      order.push(remaining.remove(worst));
    }
    order
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Scores members by their first objective, lower objective is better.
  struct ByFirstObjective;

  impl DiversityEstimator for ByFirstObjective {
    fn score<S: Evaluated>(&self, front: &[S]) -> Vec<f64> {
      front.iter().map(|s| -s.objectives()[0]).collect()
    }
  }

  #[test]
  fn test_default_eviction_order() {
    let front = vec![vec![2.0], vec![5.0], vec![1.0], vec![5.0]];
    assert_eq!(ByFirstObjective.eviction_order(&front, 3), vec![1, 3, 0]);
    assert_eq!(ByFirstObjective.eviction_order(&front, 10).len(), 4);
    assert!(ByFirstObjective.eviction_order(&front, 0).is_empty());
  }
}

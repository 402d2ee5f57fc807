use super::DiversityEstimator;
use crate::solution::Evaluated;

/// NSGA-II crowding distance.
///
/// For every objective, the members of a front are sorted by that
/// objective. The boundary members get an infinite distance, every other
/// member accumulates the normalized distance between its two neighbours.
/// Fronts of one or two members are all boundary.
///
/// # Examples
/// ```
/// # use moea_core::estimator::{CrowdingDistance, DiversityEstimator};
/// let front: Vec<Vec<f64>> =
///   vec![vec![0.0, 4.0], vec![1.0, 3.0], vec![3.0, 1.0], vec![4.0, 0.0]];
/// let distances = CrowdingDistance.score(&front);
/// assert_eq!(distances[0], f64::INFINITY);
/// assert_eq!(distances[1], 1.5);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct CrowdingDistance;

impl DiversityEstimator for CrowdingDistance {
  fn score<S: Evaluated>(&self, front: &[S]) -> Vec<f64> {
    let mut distances = vec![0.0; front.len()];
    if front.len() <= 2 {
      distances.fill(f64::INFINITY);
      return distances;
    }

    let objective_cnt = front[0].objectives().len();
    let mut sorted: Vec<usize> = (0..front.len()).collect();
    for o in 0..objective_cnt {
      let value = |idx: usize| front[idx].objectives()[o];
      sorted.sort_by(|&a, &b| value(a).total_cmp(&value(b)));

      let (first, last) = (sorted[0], sorted[sorted.len() - 1]);
      distances[first] = f64::INFINITY;
      distances[last] = f64::INFINITY;

      let range = value(last) - value(first);
      if range <= 0.0 || !range.is_finite() {
        continue;
      }
      for window in sorted.windows(3) {
        let (prev, idx, next) = (window[0], window[1], window[2]);
        distances[idx] += (value(next) - value(prev)) / range;
      }
    }

    distances
  }
}

use super::DiversityEstimator;
use crate::{
  error::{Error, Result},
  score::normalized_objectives,
  solution::Evaluated,
};

/// SPEA2 density: the Euclidean distance of a member to its `k`-th nearest
/// neighbour in the normalized objective space.
///
/// `k` is clamped to the number of other members when scoring, and a lone
/// member has an infinite distance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NearestNeighborDistance {
  k: usize,
}

impl NearestNeighborDistance {
  /// Creates an estimator measuring the distance to the nearest neighbour.
  pub fn new() -> Self {
    Self { k: 1 }
  }

  /// Creates an estimator measuring the distance to the `k`-th nearest
  /// neighbour. SPEA2 uses the square root of the population size.
  ///
  /// # Errors
  ///
  /// Returns [`Error::InvalidParameter`] if `k` is zero.
  pub fn with_k(k: usize) -> Result<Self> {
    if k == 0 {
      return Err(Error::invalid("k", "must be at least 1"));
    }
    Ok(Self { k })
  }

  /// Returns the neighbour rank the distance is measured to.
  pub fn k(&self) -> usize {
    self.k
  }
}

impl Default for NearestNeighborDistance {
  fn default() -> Self {
    Self::new()
  }
}

impl DiversityEstimator for NearestNeighborDistance {
  fn score<S: Evaluated>(&self, front: &[S]) -> Vec<f64> {
    if front.len() == 1 {
      return vec![f64::INFINITY];
    }
    let k = self.k.min(front.len().saturating_sub(1));
    let points = normalized_objectives(front);
    let mut distances = Vec::with_capacity(front.len());
    points
      .iter()
      .enumerate()
      .map(|(i, a)| {
        distances.clear();
        distances.extend(points.iter().enumerate().filter(|&(j, _)| j != i).map(
          |(_, b)| {
            a.iter()
              .zip(b)
              .map(|(a, b)| (a - b).powi(2))
              .sum::<f64>()
              .sqrt()
          },
        ));
        distances.sort_unstable_by(f64::total_cmp);
        distances[k - 1]
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_small_fronts() {
    let estimator = NearestNeighborDistance::new();
    assert!(estimator.score::<Vec<f64>>(&[]).is_empty());
    assert_eq!(estimator.score(&[vec![3.0]]), vec![f64::INFINITY]);
  }

  #[test]
  fn test_nearest_neighbor_distance() {
    let front = vec![vec![0.0, 1.0], vec![0.25, 0.75], vec![1.0, 0.0]];
    let nearest = NearestNeighborDistance::new().score(&front);
    let expected = (2.0 * 0.25f64.powi(2)).sqrt();
    assert!((nearest[0] - expected).abs() < 1e-12);
    assert!((nearest[1] - expected).abs() < 1e-12);
    assert!((nearest[2] - (2.0 * 0.75f64.powi(2)).sqrt()).abs() < 1e-12);

    // k is clamped to the number of neighbours
    let second = NearestNeighborDistance::with_k(5).unwrap().score(&front);
    assert!((second[0] - 2.0f64.sqrt()).abs() < 1e-12);
  }

  #[test]
  fn test_eviction_drops_closest_pair_member() {
    let front = vec![
      vec![0.0, 1.0],
      vec![0.5, 0.5],
      vec![0.51, 0.49],
      vec![1.0, 0.0],
    ];
    assert_eq!(
      NearestNeighborDistance::new().eviction_order(&front, 1),
      vec![1]
    );
  }

  #[test]
  fn test_zero_k() {
    assert!(matches!(
      NearestNeighborDistance::with_k(0),
      Err(Error::InvalidParameter { name: "k", .. })
    ));
  }
}

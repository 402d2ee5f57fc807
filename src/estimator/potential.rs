//! Estimators whose scores are sums of pairwise influences.
//!
//! A member's score is the negated sum of the influences every other member
//! exerts on it. Removing a member only removes its own influences, so the
//! scores of the remaining members are updated in place instead of being
//! recomputed.

use itertools::Itertools;

use super::DiversityEstimator;
use crate::{
  error::{Error, Result},
  score::{normalized_objectives, Score},
  solution::Evaluated,
};

/// Influence matrix of a front: `influence[y][x]` is the penalty member `y`
/// adds to member `x`. The diagonal is ignored.
struct Influence {
  influence: Vec<Vec<f64>>,
}

impl Influence {
  fn new(
    points: &[Vec<Score>],
    influence: impl Fn(&[Score], &[Score]) -> f64,
  ) -> Self {
    let influence = points
      .iter()
      .map(|y| {
        points
          .iter()
          .map(|x| influence(y.as_slice(), x.as_slice()))
          .collect()
      })
      .collect();
    Self { influence }
  }

  fn scores(&self) -> Vec<f64> {
    (0..self.influence.len())
      .map(|x| {
        -self
          .influence
          .iter()
          .enumerate()
          .filter(|&(y, _)| y != x)
          .map(|(_, row)| row[x])
          .sum::<f64>()
      })
      .collect()
  }

  /// Evicts the lowest score `count` times, adding the influences of the
  /// evicted member back to the scores of the remaining ones.
  fn eviction_order(&self, count: usize) -> Vec<usize> {
    let mut scores = self.scores();
    let mut alive = vec![true; scores.len()];
    let mut order = Vec::with_capacity(count.min(scores.len()));
    while order.len() < count {
      let Some(worst) = scores
        .iter()
        .enumerate()
        .filter(|&(idx, _)| alive[idx])
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(idx, _)| idx)
      else {
        break;
      };
      alive[worst] = false;
      order.push(worst);
      for (x, score) in scores.iter_mut().enumerate() {
        if alive[x] {
          *score += self.influence[worst][x];
        }
      }
    }
    order
  }
}

/// IBEA fitness based on the additive epsilon indicator.
///
/// Objectives are normalized to `[0, 1]` over the scored front. For every
/// ordered pair, `I(y, x) = max_i(y_i - x_i)` is the smallest translation
/// that makes `y` weakly dominate `x`, and `y` adds
/// `exp(-I(y, x) / (kappa * c))` to the penalty of `x`, where `c` is the
/// largest absolute indicator value of the front.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct IndicatorPotential {
  kappa: f64,
}

impl IndicatorPotential {
  /// Default scaling factor.
  pub const DEFAULT_KAPPA: f64 = 0.05;

  /// Creates an estimator with [`DEFAULT_KAPPA`](Self::DEFAULT_KAPPA).
  pub fn new() -> Self {
    Self {
      kappa: Self::DEFAULT_KAPPA,
    }
  }

  /// Creates an estimator with a custom fitness scaling factor.
  ///
  /// # Errors
  ///
  /// Returns [`Error::InvalidParameter`] if `kappa` is not positive and
  /// finite.
  pub fn with_kappa(kappa: f64) -> Result<Self> {
    if !kappa.is_finite() || kappa <= 0.0 {
      return Err(Error::invalid(
        "kappa",
        format!("must be positive and finite, got {kappa}"),
      ));
    }
    Ok(Self { kappa })
  }

  /// Returns the fitness scaling factor.
  pub fn kappa(&self) -> f64 {
    self.kappa
  }

  fn influence<S: Evaluated>(&self, front: &[S]) -> Influence {
    let points = normalized_objectives(front);
    let epsilon = |y: &[Score], x: &[Score]| {
      y.iter()
        .zip(x)
        .map(|(y, x)| y - x)
        .fold(f64::NEG_INFINITY, f64::max)
    };
    let c = points
      .iter()
      .tuple_combinations()
      .flat_map(|(a, b)| {
        let (a, b) = (a.as_slice(), b.as_slice());
        [epsilon(a, b).abs(), epsilon(b, a).abs()]
      })
      .fold(0.0, f64::max);
    let scale = self.kappa * if c > 0.0 { c } else { 1.0 };
    Influence::new(&points, |y, x| (-epsilon(y, x) / scale).exp())
  }
}

impl Default for IndicatorPotential {
  fn default() -> Self {
    Self::new()
  }
}

impl DiversityEstimator for IndicatorPotential {
  fn score<S: Evaluated>(&self, front: &[S]) -> Vec<f64> {
    self.influence(front).scores()
  }

  fn eviction_order<S: Evaluated>(
    &self,
    front: &[S],
    count: usize,
  ) -> Vec<usize> {
    self.influence(front).eviction_order(count)
  }
}

/// ESPEA electrostatic energy.
///
/// Members are treated as equal charges in the normalized objective space.
/// Each pair repels with the Coulomb potential `1 / d`, and evicting the
/// member with the highest energy spreads the front out.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ElectrostaticEnergy;

impl ElectrostaticEnergy {
  /// Distance floor, keeps the potential of coinciding members finite.
  pub const MIN_DISTANCE: f64 = 1e-9;

  fn influence<S: Evaluated>(&self, front: &[S]) -> Influence {
    let points = normalized_objectives(front);
    Influence::new(&points, |y, x| {
      let distance = y
        .iter()
        .zip(x)
        .map(|(y, x)| (y - x).powi(2))
        .sum::<f64>()
        .sqrt();
      1.0 / distance.max(Self::MIN_DISTANCE)
    })
  }
}

impl DiversityEstimator for ElectrostaticEnergy {
  fn score<S: Evaluated>(&self, front: &[S]) -> Vec<f64> {
    self.influence(front).scores()
  }

  fn eviction_order<S: Evaluated>(
    &self,
    front: &[S],
    count: usize,
  ) -> Vec<usize> {
    self.influence(front).eviction_order(count)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_small_fronts() {
    assert!(IndicatorPotential::new().score::<Vec<f64>>(&[]).is_empty());
    assert_eq!(IndicatorPotential::new().score(&[vec![1.0, 2.0]]), vec![0.0]);
    assert_eq!(ElectrostaticEnergy.score(&[vec![1.0, 2.0]]), vec![0.0]);
    assert!(ElectrostaticEnergy
      .eviction_order::<Vec<f64>>(&[], 3)
      .is_empty());
  }

  #[test]
  fn test_indicator_potential_penalizes_dominated() {
    let front = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0]];
    let scores = IndicatorPotential::new().score(&front);
    assert!(scores[1] < scores[2]);
    assert!(scores[2] < scores[0]);
    assert_eq!(
      IndicatorPotential::new().eviction_order(&front, 2),
      vec![1, 2]
    );
  }

  #[test]
  fn test_energy_evicts_crowded_member() {
    let front = vec![
      vec![0.0, 1.0],
      vec![0.5, 0.5],
      vec![0.52, 0.48],
      vec![1.0, 0.0],
    ];
    let order = ElectrostaticEnergy.eviction_order(&front, 1);
    assert!(order == vec![1] || order == vec![2]);
  }

  #[test]
  fn test_incremental_eviction_matches_recomputation() {
    let front = vec![
      vec![0.0, 1.0],
      vec![0.1, 0.8],
      vec![0.3, 0.6],
      vec![0.35, 0.55],
      vec![0.7, 0.2],
      vec![1.0, 0.0],
    ];
    for influence in [
      ElectrostaticEnergy.influence(&front),
      IndicatorPotential::new().influence(&front),
    ] {
      let order = influence.eviction_order(3);
      assert_eq!(order.len(), 3);

      let mut survivors: Vec<usize> = (0..front.len()).collect();
      for evicted in order {
        let remaining = Influence {
          influence: survivors
            .iter()
            .map(|&y| {
              survivors.iter().map(|&x| influence.influence[y][x]).collect()
            })
            .collect(),
        };
        let worst = remaining
          .scores()
          .iter()
          .enumerate()
          .min_by(|(_, a), (_, b)| a.total_cmp(b))
          .map(|(idx, _)| idx)
          .unwrap();
        assert_eq!(survivors.remove(worst), evicted);
      }
    }
  }

  #[test]
  fn test_invalid_kappa() {
    assert!(IndicatorPotential::with_kappa(0.0).is_err());
    assert!(IndicatorPotential::with_kappa(-1.0).is_err());
    assert_eq!(IndicatorPotential::with_kappa(0.5).unwrap().kappa(), 0.5);
  }
}

//! Type aliases for objective values and the Pareto dominance relation over
//! raw objective vectors.

use std::cmp::Ordering;

use itertools::{Itertools, MinMaxResult};

use crate::solution::Evaluated;

/// An alias for an objective value.
///
/// Every objective is **minimized**. If your goal is to maximize a value,
/// negate it before handing it to the crate.
pub type Score = f64;

/// Describes Pareto dominance for slices of `Score`.
pub(crate) trait ParetoDominance {
  /// Returns `Less` if `self` dominates `other`, `Greater` if `other`
  /// dominates `self`, otherwise `Equal`. `self` dominates `other` if no
  /// `self` value is greater than the respective `other` value and at least
  /// one is strictly lower. A `NaN` on either side makes the pair
  /// incomparable.
  fn dominance(&self, other: &Self) -> Ordering;
}

impl ParetoDominance for [Score] {
  fn dominance(&self, other: &Self) -> Ordering {
    debug_assert_eq!(
      self.len(),
      other.len(),
      "objective vectors of different lengths"
    );
    let mut ord = Ordering::Equal;
    for (a, b) in self.iter().zip(other) {
      match (ord, a.partial_cmp(b)) {
        (_, None) => return Ordering::Equal,
        (Ordering::Equal, Some(next_ord)) => ord = next_ord,
        (Ordering::Greater, Some(Ordering::Less))
        | (Ordering::Less, Some(Ordering::Greater)) => return Ordering::Equal,
        _ => {}
      }
    }
    ord
  }
}

/// Per-objective minimum and maximum of a set of solutions, `None` for an
/// empty set.
pub(crate) fn objective_bounds<S: Evaluated>(
  solutions: &[S],
) -> Option<(Vec<Score>, Vec<Score>)> {
  let objective_cnt = solutions.first()?.objectives().len();
  let (min, max) = (0..objective_cnt)
    .map(|o_idx| {
      match solutions
        .iter()
        .map(|s| s.objectives()[o_idx])
        .minmax_by(f64::total_cmp)
      {
        MinMaxResult::NoElements => (0.0, 0.0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(min, max) => (min, max),
      }
    })
    .unzip();
  Some((min, max))
}

/// Maps objective vectors into `[0, 1]` per objective using the bounds of
/// the set itself. Objectives with zero range map to `0`.
pub(crate) fn normalized_objectives<S: Evaluated>(
  solutions: &[S],
) -> Vec<Vec<Score>> {
  let Some((min, max)) = objective_bounds(solutions) else {
    return Vec::new();
  };
  solutions
    .iter()
    .map(|s| {
      s.objectives()
        .iter()
        .zip(min.iter().zip(&max))
        .map(|(v, (lo, hi))| {
          let range = hi - lo;
          if range > 0.0 {
            (v - lo) / range
          } else {
            0.0
          }
        })
        .collect()
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use std::cmp::Ordering;

  use super::*;

  #[test]
  fn test_pareto_dominance() {
    assert_eq!([1.0, 2.0, 3.0].dominance(&[1.0, 2.0, 3.0]), Ordering::Equal);
    assert_eq!([1.0, 2.0, 3.0].dominance(&[3.0, 2.0, 1.0]), Ordering::Equal);
    assert_eq!(
      [-1.0, 2.0, -3.0].dominance(&[-3.0, 2.0, -1.0]),
      Ordering::Equal
    );

    assert_eq!(
      [10.0, 2.0, 3.0].dominance(&[1.0, 2.0, 3.0]),
      Ordering::Greater
    );
    assert_eq!(
      [1.0, 2.0, 30.0].dominance(&[1.0, 2.0, 3.0]),
      Ordering::Greater
    );
    assert_eq!(
      [-1.0, 2.0, 3.0].dominance(&[-2.0, 2.0, 3.0]),
      Ordering::Greater
    );

    assert_eq!([1.0, 2.0, 3.0].dominance(&[10.0, 2.0, 3.0]), Ordering::Less);
    assert_eq!([1.0, 2.0, 3.0].dominance(&[1.0, 20.0, 3.0]), Ordering::Less);
    assert_eq!(
      [-2.0, 2.0, -3.0].dominance(&[-1.0, 2.0, 4.0]),
      Ordering::Less
    );

    assert_eq!([1.0; 0].dominance(&[0.0; 0]), Ordering::Equal);
  }

  #[test]
  fn test_nan_is_incomparable() {
    assert_eq!([f64::NAN, 0.0].dominance(&[1.0, 1.0]), Ordering::Equal);
    assert_eq!([0.0, 0.0].dominance(&[1.0, f64::NAN]), Ordering::Equal);
  }

  #[test]
  fn test_objective_bounds() {
    let front = vec![vec![1.0, 5.0], vec![3.0, 2.0], vec![2.0, 4.0]];
    let (min, max) = objective_bounds(&front).unwrap();
    assert_eq!(min, vec![1.0, 2.0]);
    assert_eq!(max, vec![3.0, 5.0]);
    assert!(objective_bounds::<Vec<f64>>(&[]).is_none());
  }

  #[test]
  fn test_normalized_objectives_zero_range() {
    let front = vec![vec![1.0, 7.0], vec![3.0, 7.0]];
    let normalized = normalized_objectives(&front);
    assert_eq!(normalized, vec![vec![0.0, 0.0], vec![1.0, 0.0]]);
  }
}

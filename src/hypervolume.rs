//! Exact hypervolume indicator.
//!
//! The hypervolume of a front is the Lebesgue measure of the region of
//! objective space dominated by the front and bounded by a reference point.
//! It is used both as a quality indicator and, through
//! [`HypervolumeContribution`], as a diversity estimator.
//!
//! The computation follows the recursive slicing algorithm of Zitzler's PISA
//! implementation. Points are first inverted into a maximization frame whose
//! origin is the reference point, then the algorithm sweeps along the last
//! objective, recursing on the remaining ones. Its cost is exponential in
//! the number of objectives in the worst case, so callers should avoid
//! computing it on fronts with more than 5-6 objectives inside per-generation
//! loops.
//!
//! [`HypervolumeContribution`]: crate::estimator::HypervolumeContribution

use std::cmp::Ordering;

use crate::{
  error::{Error, Result},
  score::{objective_bounds, ParetoDominance, Score},
  solution::Evaluated,
};

/// The hypervolume indicator.
///
/// # Examples
/// ```
/// # use moea_core::hypervolume::Hypervolume;
/// let front: Vec<Vec<f64>> =
///   vec![vec![1.0, 3.0], vec![2.0, 2.0], vec![3.0, 1.0]];
/// let volume = Hypervolume.compute(&front, &[4.0, 4.0]).unwrap();
/// assert_eq!(volume, 6.0);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Hypervolume;

impl Hypervolume {
  /// Computes the volume dominated by `front` and bounded by
  /// `reference_point`. All objectives are minimized.
  ///
  /// Points that do not strictly dominate the reference point in some
  /// objective contribute nothing along that objective. An empty front has a
  /// volume of `0`.
  ///
  /// # Errors
  ///
  /// Returns [`Error::NoObjectives`] for an empty reference point and
  /// [`Error::DimensionMismatch`] if a point has a different number of
  /// objectives than the reference point.
  pub fn compute<S: Evaluated>(
    &self,
    front: &[S],
    reference_point: &[Score],
  ) -> Result<Score> {
    if reference_point.is_empty() {
      return Err(Error::NoObjectives);
    }
    for s in front {
      Error::check_dimension(reference_point.len(), s.objectives().len())?;
    }
    let inverted =
      InvertedFront::new(front.iter().map(|s| s.objectives()), reference_point);
    Ok(inverted.volume())
  }
}

/// Hypervolume of a front normalized by the bounds of a reference front.
///
/// Every objective is mapped into `[0, 1]` using the minimum and maximum of
/// the reference front, then the volume is measured against the point
/// `1 + offset` in every objective. This is the usual way of comparing the
/// quality of fronts produced by different runs of an algorithm.
#[derive(Clone, PartialEq, Debug)]
pub struct NormalizedHypervolume {
  minimum: Vec<Score>,
  maximum: Vec<Score>,
  offset: Score,
}

impl NormalizedHypervolume {
  /// Creates the indicator from a reference front, e.g. one read with
  /// [`read_front`](crate::front::read_front).
  ///
  /// # Errors
  ///
  /// Returns [`Error::EmptyFront`] if the reference front has no points,
  /// [`Error::NoObjectives`] if its points have no objectives and
  /// [`Error::DimensionMismatch`] if they differ in length.
  pub fn new<S: Evaluated>(reference_front: &[S]) -> Result<Self> {
    let first = reference_front.first().ok_or(Error::EmptyFront)?;
    let objective_cnt = first.objectives().len();
    if objective_cnt == 0 {
      return Err(Error::NoObjectives);
    }
    for s in reference_front {
      Error::check_dimension(objective_cnt, s.objectives().len())?;
    }
    let (minimum, maximum) =
      objective_bounds(reference_front).ok_or(Error::EmptyFront)?;
    Ok(Self {
      minimum,
      maximum,
      offset: 0.0,
    })
  }

  /// Moves the reference point `offset` units beyond the normalized nadir,
  /// so that extreme points contribute to the volume too.
  ///
  /// # Errors
  ///
  /// Returns [`Error::InvalidParameter`] if `offset` is negative or not
  /// finite.
  pub fn with_offset(mut self, offset: Score) -> Result<Self> {
    if !offset.is_finite() || offset < 0.0 {
      return Err(Error::invalid(
        "offset",
        format!("must be finite and non-negative, got {offset}"),
      ));
    }
    self.offset = offset;
    Ok(self)
  }

  /// Returns the number of objectives of the reference front.
  pub fn objective_count(&self) -> usize {
    self.minimum.len()
  }

  /// Computes the normalized hypervolume of `front`.
  ///
  /// # Errors
  ///
  /// Returns [`Error::DimensionMismatch`] if a point of `front` has a
  /// different number of objectives than the reference front.
  pub fn compute<S: Evaluated>(&self, front: &[S]) -> Result<Score> {
    let normalized = front
      .iter()
      .map(|s| {
        Error::check_dimension(self.objective_count(), s.objectives().len())?;
        Ok(
          s.objectives()
            .iter()
            .zip(self.minimum.iter().zip(&self.maximum))
            .map(|(v, (lo, hi))| {
              let range = hi - lo;
              (v - lo) / if range > 0.0 { range } else { 1.0 }
            })
            .collect::<Vec<_>>(),
        )
      })
      .collect::<Result<Vec<_>>>()?;
    let reference_point = vec![1.0 + self.offset; self.objective_count()];
    Hypervolume.compute(&normalized, &reference_point)
  }
}

/// Points translated into a maximization frame with the reference point at
/// the origin, stored row by row in one owned buffer. Recursion only
/// permutes index slices, the buffer itself is never modified.
pub(crate) struct InvertedFront {
  values: Vec<Score>,
  objective_cnt: usize,
}

impl InvertedFront {
  pub(crate) fn new<'a>(
    points: impl Iterator<Item = &'a [Score]>,
    reference_point: &[Score],
  ) -> Self {
    let values = points
      .flat_map(|p| {
        p.iter()
          .zip(reference_point)
          // `max` also maps NaN to 0
          .map(|(v, r)| (r - v).max(0.0))
      })
      .collect();
    Self {
      values,
      objective_cnt: reference_point.len(),
    }
  }

  pub(crate) fn point_count(&self) -> usize {
    if self.objective_cnt == 0 {
      0
    } else {
      self.values.len() / self.objective_cnt
    }
  }

  /// Volume of the whole front.
  pub(crate) fn volume(&self) -> Score {
    let mut indices: Vec<usize> = (0..self.point_count()).collect();
    self.volume_of(&mut indices)
  }

  /// Exclusive contribution of every point: the volume lost when that point
  /// alone is removed.
  pub(crate) fn contributions(&self) -> Vec<Score> {
    let point_cnt = self.point_count();
    let total = self.volume();
    let mut indices = Vec::with_capacity(point_cnt);
    (0..point_cnt)
      .map(|excluded| {
        indices.clear();
        indices.extend((0..point_cnt).filter(|&idx| idx != excluded));
        (total - self.volume_of(&mut indices)).max(0.0)
      })
      .collect()
  }

  /// Volume of the points referenced by `indices`. Reorders `indices`.
  fn volume_of(&self, indices: &mut [usize]) -> Score {
    match (indices.len(), self.objective_cnt) {
      (0, _) | (_, 0) => 0.0,
      (_, 1) => indices
        .iter()
        .map(|&idx| self.values[idx])
        .fold(0.0, Score::max),
      (_, objective_cnt) => self.sweep(indices, objective_cnt),
    }
  }

  fn value(&self, idx: usize, objective: usize) -> Score {
    self.values[idx * self.objective_cnt + objective]
  }

  fn head(&self, idx: usize, objective_cnt: usize) -> &[Score] {
    let start = idx * self.objective_cnt;
    &self.values[start..start + objective_cnt]
  }

  /// Sweeps along objective `objective_cnt - 1`, accumulating slabs whose
  /// cross-section is the volume of the remaining objectives.
  fn sweep(&self, indices: &mut [usize], objective_cnt: usize) -> Score {
    debug_assert!(objective_cnt >= 2);
    let last = objective_cnt - 1;
    let mut volume = 0.0;
    let mut distance = 0.0;
    let mut point_cnt = indices.len();

    while point_cnt > 0 {
      let nondominated_cnt =
        self.filter_nondominated(&mut indices[..point_cnt], last);
      let section = if objective_cnt < 3 {
        // best point of the single remaining objective
        self.value(indices[0], 0)
      } else {
        self.sweep(&mut indices[..nondominated_cnt], last)
      };
      let next_distance = indices[..point_cnt]
        .iter()
        .map(|&idx| self.value(idx, last))
        .fold(Score::INFINITY, Score::min);
      volume += section * (next_distance - distance);
      distance = next_distance;
      point_cnt = self.reduce(&mut indices[..point_cnt], last, distance);
    }

    volume
  }

  /// Moves points that are non-dominated with respect to the first
  /// `objective_cnt` objectives to the head of `indices` and returns how many
  /// there are.
  fn filter_nondominated(
    &self,
    indices: &mut [usize],
    objective_cnt: usize,
  ) -> usize {
    let mut point_cnt = indices.len();
    let mut i = 0;
    while i < point_cnt {
      let mut j = i + 1;
      let mut i_removed = false;
      while j < point_cnt {
        let p = self.head(indices[i], objective_cnt);
        let q = self.head(indices[j], objective_cnt);
        // larger values are better in the inverted frame
        match p.dominance(q) {
          Ordering::Greater => {
            point_cnt -= 1;
            indices.swap(j, point_cnt);
          }
          Ordering::Less => {
            point_cnt -= 1;
            indices.swap(i, point_cnt);
            i_removed = true;
            break;
          }
          Ordering::Equal => j += 1,
        }
      }
      if !i_removed {
        i += 1;
      }
    }
    point_cnt
  }

  /// Moves points whose `objective` value is not above `threshold` to the
  /// tail of `indices` and returns how many points remain.
  fn reduce(
    &self,
    indices: &mut [usize],
    objective: usize,
    threshold: Score,
  ) -> usize {
    let mut point_cnt = indices.len();
    let mut i = 0;
    while i < point_cnt {
      if self.value(indices[i], objective) <= threshold {
        point_cnt -= 1;
        indices.swap(i, point_cnt);
      } else {
        i += 1;
      }
    }
    point_cnt
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  /// Union volume of boxes `[p, reference]` by inclusion-exclusion.
  fn brute_force(points: &[Vec<f64>], reference: &[f64]) -> f64 {
    let n = points.len();
    (1..1usize << n)
      .map(|mask| {
        let corner: Vec<f64> = (0..reference.len())
          .map(|o| {
            (0..n)
              .filter(|i| mask & (1 << i) != 0)
              .map(|i| points[i][o])
              .fold(f64::NEG_INFINITY, f64::max)
          })
          .collect();
        let volume: f64 = corner
          .iter()
          .zip(reference)
          .map(|(c, r)| (r - c).max(0.0))
          .product();
        if mask.count_ones() % 2 == 1 {
          volume
        } else {
          -volume
        }
      })
      .sum()
  }

  #[test]
  fn test_single_point() {
    let front = vec![vec![1.0, 1.0]];
    assert_eq!(Hypervolume.compute(&front, &[2.0, 2.0]).unwrap(), 1.0);

    let front = vec![vec![0.0, 0.0, 0.0]];
    assert_eq!(Hypervolume.compute(&front, &[1.0, 2.0, 3.0]).unwrap(), 6.0);
  }

  #[test]
  fn test_point_beyond_reference_is_clamped() {
    let front = vec![vec![3.0, 1.0]];
    assert_eq!(Hypervolume.compute(&front, &[2.0, 2.0]).unwrap(), 0.0);
  }

  #[test]
  fn test_empty_front() {
    let front: Vec<Vec<f64>> = vec![];
    assert_eq!(Hypervolume.compute(&front, &[1.0, 1.0]).unwrap(), 0.0);
  }

  #[test]
  fn test_two_objectives_staircase() {
    let front = vec![vec![1.0, 3.0], vec![2.0, 2.0], vec![3.0, 1.0]];
    assert_eq!(Hypervolume.compute(&front, &[4.0, 4.0]).unwrap(), 6.0);
  }

  #[test]
  fn test_dominated_points_add_nothing() {
    let front = vec![vec![1.0, 3.0], vec![3.0, 1.0]];
    let with_dominated =
      vec![vec![1.0, 3.0], vec![3.0, 1.0], vec![3.5, 3.5], vec![3.0, 3.0]];
    let reference = [4.0, 4.0];
    assert_eq!(
      Hypervolume.compute(&front, &reference).unwrap(),
      Hypervolume.compute(&with_dominated, &reference).unwrap()
    );
  }

  #[test]
  fn test_three_objectives() {
    let front = vec![vec![0.0, 0.0, 1.0], vec![1.0, 1.0, 0.0]];
    assert_eq!(Hypervolume.compute(&front, &[2.0, 2.0, 2.0]).unwrap(), 5.0);
  }

  #[test]
  fn test_one_objective() {
    let front = vec![vec![3.0], vec![1.0], vec![2.0]];
    assert_eq!(Hypervolume.compute(&front, &[5.0]).unwrap(), 4.0);
  }

  #[test]
  fn test_dimension_mismatch() {
    let front = vec![vec![1.0, 1.0, 1.0]];
    assert!(matches!(
      Hypervolume.compute(&front, &[2.0, 2.0]),
      Err(Error::DimensionMismatch {
        expected: 2,
        found: 3
      })
    ));
    assert!(matches!(
      Hypervolume.compute(&front, &[]),
      Err(Error::NoObjectives)
    ));
  }

  #[test]
  fn test_contributions() {
    let front = [[1.0, 3.0], [2.0, 2.0], [3.0, 1.0]];
    let inverted =
      InvertedFront::new(front.iter().map(|p| p.as_slice()), &[4.0, 4.0]);
    assert_eq!(inverted.contributions(), vec![1.0, 1.0, 1.0]);
  }

  #[test]
  fn test_normalized_hypervolume() {
    let reference_front = vec![vec![0.0, 10.0], vec![5.0, 0.0]];
    let indicator = NormalizedHypervolume::new(&reference_front).unwrap();
    assert_eq!(indicator.compute(&[vec![0.0, 0.0]]).unwrap(), 1.0);
    assert_eq!(indicator.compute(&reference_front).unwrap(), 0.0);

    let indicator = indicator.with_offset(0.5).unwrap();
    assert_eq!(indicator.compute(&[vec![0.0, 0.0]]).unwrap(), 2.25);
    assert_eq!(indicator.compute(&[vec![2.5, 5.0]]).unwrap(), 1.0);
  }

  #[test]
  fn test_normalized_hypervolume_errors() {
    assert!(matches!(
      NormalizedHypervolume::new::<Vec<f64>>(&[]),
      Err(Error::EmptyFront)
    ));
    let ragged = vec![vec![0.0, 1.0], vec![1.0]];
    assert!(matches!(
      NormalizedHypervolume::new(&ragged),
      Err(Error::DimensionMismatch { .. })
    ));
    let indicator = NormalizedHypervolume::new(&[vec![0.0, 1.0]]).unwrap();
    assert!(indicator.clone().with_offset(-1.0).is_err());
    assert!(indicator.compute(&[vec![0.0]]).is_err());
  }

  proptest! {
    #[test]
    fn prop_matches_inclusion_exclusion(
      points in prop::collection::vec(
        prop::collection::vec(0.0..10.0f64, 3),
        1..7,
      )
    ) {
      let reference = [10.0, 10.0, 10.0];
      let volume = Hypervolume.compute(&points, &reference).unwrap();
      let expected = brute_force(&points, &reference);
      prop_assert!((volume - expected).abs() <= 1e-6 * expected.max(1.0));
    }

    #[test]
    fn prop_adding_a_point_never_decreases_volume(
      points in prop::collection::vec(
        prop::collection::vec(0.0..10.0f64, 4),
        0..12,
      ),
      extra in prop::collection::vec(0.0..10.0f64, 4),
    ) {
      let reference = [11.0; 4];
      let before = Hypervolume.compute(&points, &reference).unwrap();
      let mut extended = points.clone();
      extended.push(extra);
      let after = Hypervolume.compute(&extended, &reference).unwrap();
      prop_assert!(after >= before - 1e-9 * before.max(1.0));
    }

    #[test]
    fn prop_is_pure(
      points in prop::collection::vec(
        prop::collection::vec(0.0..10.0f64, 3),
        0..15,
      )
    ) {
      let reference = [10.0; 3];
      let first = Hypervolume.compute(&points, &reference).unwrap();
      let second = Hypervolume.compute(&points, &reference).unwrap();
      prop_assert_eq!(first.to_bits(), second.to_bits());
    }
  }
}

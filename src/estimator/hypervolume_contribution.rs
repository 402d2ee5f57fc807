use super::DiversityEstimator;
use crate::{
  error::{Error, Result},
  hypervolume::InvertedFront,
  solution::Evaluated,
};

/// Reference point used to measure hypervolume contributions.
#[derive(Clone, PartialEq, Debug)]
pub enum ReferencePoint {
  /// The same point for every front.
  Fixed(Vec<f64>),
  /// The per-objective maximum of the scored front, moved away by the given
  /// offset in every objective.
  Offset(f64),
}

/// Exclusive hypervolume contribution of every member: the volume lost when
/// that member alone is removed from the front.
///
/// Evicting by contribution keeps the subset of a front with the largest
/// hypervolume, greedily. Contributions are recomputed from scratch after
/// every eviction, which costs one hypervolume computation per member per
/// eviction. Keep this estimator for fronts with few objectives.
#[derive(Clone, PartialEq, Debug)]
pub struct HypervolumeContribution {
  reference_point: ReferencePoint,
}

impl HypervolumeContribution {
  /// Default offset of the derived reference point.
  pub const DEFAULT_OFFSET: f64 = 100.0;

  /// Creates an estimator whose reference point is derived from every front
  /// with [`DEFAULT_OFFSET`](Self::DEFAULT_OFFSET).
  pub fn new() -> Self {
    Self {
      reference_point: ReferencePoint::Offset(Self::DEFAULT_OFFSET),
    }
  }

  /// Creates an estimator whose reference point is derived from every front
  /// with the given offset.
  ///
  /// # Errors
  ///
  /// Returns [`Error::InvalidParameter`] if `offset` is not positive and
  /// finite.
  pub fn with_offset(offset: f64) -> Result<Self> {
    if !offset.is_finite() || offset <= 0.0 {
      return Err(Error::invalid(
        "offset",
        format!("must be positive and finite, got {offset}"),
      ));
    }
    Ok(Self {
      reference_point: ReferencePoint::Offset(offset),
    })
  }

  /// Creates an estimator that measures every front against `point`.
  ///
  /// # Errors
  ///
  /// Returns [`Error::NoObjectives`] if `point` is empty.
  pub fn with_reference_point(point: Vec<f64>) -> Result<Self> {
    if point.is_empty() {
      return Err(Error::NoObjectives);
    }
    Ok(Self {
      reference_point: ReferencePoint::Fixed(point),
    })
  }

  /// Returns the configured reference point.
  pub fn reference_point(&self) -> &ReferencePoint {
    &self.reference_point
  }

  fn reference_for<S: Evaluated>(&self, front: &[S]) -> Vec<f64> {
    match &self.reference_point {
      ReferencePoint::Fixed(point) => point.clone(),
      ReferencePoint::Offset(offset) => {
        let objective_cnt = front[0].objectives().len();
        (0..objective_cnt)
          .map(|o| {
            front
              .iter()
              .map(|s| s.objectives()[o])
              .fold(f64::NEG_INFINITY, f64::max)
              + offset
          })
          .collect()
      }
    }
  }
}

impl Default for HypervolumeContribution {
  fn default() -> Self {
    Self::new()
  }
}

impl DiversityEstimator for HypervolumeContribution {
  /// # Panics
  ///
  /// Panics if a fixed reference point and the members of `front` have
  /// different numbers of objectives.
  fn score<S: Evaluated>(&self, front: &[S]) -> Vec<f64> {
    if front.is_empty() {
      return Vec::new();
    }
    let reference_point = self.reference_for(front);
    for s in front {
      assert_eq!(
        s.objectives().len(),
        reference_point.len(),
        "reference point and front have different numbers of objectives"
      );
    }
    InvertedFront::new(front.iter().map(|s| s.objectives()), &reference_point)
      .contributions()
  }
}

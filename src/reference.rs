//! NSGA-III environmental selection over a lattice of reference points.
//!
//! Whole fronts are accepted while they fit. The solutions of the first
//! front that does not fit compete for the remaining slots: every solution
//! is associated with its nearest reference line in normalized objective
//! space, and slots go to candidates of the least crowded reference points
//! first.

use itertools::Itertools;
use log::{debug, trace};
use rand::Rng;
use typed_builder::TypedBuilder;

use crate::{
  error::{Error, Result},
  ranking::{FastNonDominatedRanking, RankingStrategy},
  score::Score,
  solution::Evaluated,
};

/// Configuration of a [`ReferenceLattice`].
#[derive(TypedBuilder, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LatticeConfig {
  /// Number of objectives.
  pub objectives: usize,
  /// Number of divisions of every simplex edge.
  pub divisions: usize,
  /// Number of divisions of the inner layer. No inner layer if `None`.
  #[builder(default, setter(strip_option))]
  pub inner_divisions: Option<usize>,
}

/// A set of reference points on the unit simplex: every point has
/// non-negative coordinates summing to 1.
#[derive(Clone, PartialEq, Debug)]
pub struct ReferenceLattice {
  points: Vec<Vec<Score>>,
  objective_cnt: usize,
}

impl ReferenceLattice {
  /// Creates the Das-Dennis lattice: every composition of `divisions` into
  /// `objectives` non-negative parts, scaled by `1 / divisions`. There are
  /// `C(divisions + objectives - 1, objectives - 1)` such points.
  ///
  /// # Errors
  ///
  /// Returns [`Error::NoObjectives`] if `objectives` is zero and
  /// [`Error::ZeroDivisions`] if `divisions` is zero.
  ///
  /// # Examples
  /// ```
  /// # use moea_core::reference::ReferenceLattice;
  /// let lattice = ReferenceLattice::simplex(3, 4).unwrap();
  /// assert_eq!(lattice.len(), 15);
  /// ```
  pub fn simplex(objectives: usize, divisions: usize) -> Result<Self> {
    if objectives == 0 {
      return Err(Error::NoObjectives);
    }
    if divisions == 0 {
      return Err(Error::ZeroDivisions);
    }
    let mut points = Vec::new();
    let mut composition = vec![0; objectives];
    compose(&mut composition, 0, divisions, divisions, &mut points);
    Ok(Self {
      points,
      objective_cnt: objectives,
    })
  }

  /// Creates a two-layer lattice for many objectives: the outer simplex
  /// lattice plus an inner one shrunk by half toward the simplex centroid.
  ///
  /// # Errors
  ///
  /// Same as [`simplex`](Self::simplex), for either layer.
  pub fn two_layer(
    objectives: usize,
    outer_divisions: usize,
    inner_divisions: usize,
  ) -> Result<Self> {
    let mut lattice = Self::simplex(objectives, outer_divisions)?;
    let inner = Self::simplex(objectives, inner_divisions)?;
    let centroid = 1.0 / objectives as Score;
    lattice.points.extend(inner.points.into_iter().map(|point| {
      point.into_iter().map(|v| (v + centroid) / 2.0).collect()
    }));
    Ok(lattice)
  }

  /// Creates a lattice from a configuration.
  ///
  /// # Errors
  ///
  /// Same as [`two_layer`](Self::two_layer).
  pub fn from_config(config: LatticeConfig) -> Result<Self> {
    match config.inner_divisions {
      Some(inner) => {
        Self::two_layer(config.objectives, config.divisions, inner)
      }
      None => Self::simplex(config.objectives, config.divisions),
    }
  }

  /// Returns the reference points.
  pub fn points(&self) -> &[Vec<Score>] {
    &self.points
  }

  /// Returns the number of reference points.
  pub fn len(&self) -> usize {
    self.points.len()
  }

  /// Always `false`, a lattice has at least one point.
  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// Returns the number of objectives.
  pub fn objective_count(&self) -> usize {
    self.objective_cnt
  }

  /// Returns the index of the reference line closest to `point` and the
  /// perpendicular distance to it. Ties go to the lowest index.
  fn associate(&self, point: &[Score]) -> (usize, Score) {
    self
      .points
      .iter()
      .map(|reference| perpendicular_distance(point, reference))
      .enumerate()
      .fold((0, Score::INFINITY), |best, (idx, distance)| {
        if distance < best.1 {
          (idx, distance)
        } else {
          best
        }
      })
  }
}

fn compose(
  composition: &mut [usize],
  depth: usize,
  left: usize,
  divisions: usize,
  points: &mut Vec<Vec<Score>>,
) {
  if depth == composition.len() - 1 {
    composition[depth] = left;
    points.push(
      composition
        .iter()
        .map(|&c| c as Score / divisions as Score)
        .collect(),
    );
    return;
  }
  for c in 0..=left {
    composition[depth] = c;
    compose(composition, depth + 1, left - c, divisions, points);
  }
}

/// Distance from `point` to the line through the origin along `reference`.
fn perpendicular_distance(point: &[Score], reference: &[Score]) -> Score {
  let norm_sq: Score = reference.iter().map(|r| r * r).sum();
  if norm_sq <= 0.0 {
    return Score::INFINITY;
  }
  let projection =
    point.iter().zip(reference).map(|(p, r)| p * r).sum::<Score>() / norm_sq;
  point
    .iter()
    .zip(reference)
    .map(|(p, r)| (p - projection * r).powi(2))
    .sum::<Score>()
    .sqrt()
}

/// Achievement scalarizing function of a translated point.
fn asf(point: &[Score], axis: usize) -> Score {
  point
    .iter()
    .enumerate()
    .map(|(o, v)| v / if o == axis { 1.0 } else { 1e-6 })
    .fold(Score::NEG_INFINITY, Score::max)
}

/// Intercepts of the hyperplane through `extremes` with the objective axes,
/// `None` if the extreme points are degenerate or an intercept is not
/// positive.
fn hyperplane_intercepts(extremes: &[Vec<Score>]) -> Option<Vec<Score>> {
  let n = extremes.len();
  // augmented matrix of `extremes * x = 1`
  let mut m: Vec<Vec<Score>> = extremes
    .iter()
    .map(|row| row.iter().copied().chain([1.0]).collect())
    .collect();

  for col in 0..n {
    let pivot = (col..n)
      .max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
    if m[pivot][col].abs() < 1e-12 {
      return None;
    }
    m.swap(col, pivot);
    for row in 0..n {
      if row != col {
        let factor = m[row][col] / m[col][col];
        for k in col..=n {
          m[row][k] -= factor * m[col][k];
        }
      }
    }
  }

  (0..n)
    .map(|o| {
      let intercept = m[o][o] / m[o][n];
      (intercept.is_finite() && intercept > 1e-10).then_some(intercept)
    })
    .collect()
}

/// Translates `points` by their ideal point and scales them by the
/// intercepts of the hyperplane through their extreme points.
fn normalize(points: &[&[Score]]) -> Vec<Vec<Score>> {
  let objective_cnt = points.first().map_or(0, |p| p.len());
  let ideal: Vec<Score> = (0..objective_cnt)
    .map(|o| points.iter().map(|p| p[o]).fold(Score::INFINITY, Score::min))
    .collect();
  let translated: Vec<Vec<Score>> = points
    .iter()
    .map(|p| p.iter().zip(&ideal).map(|(v, z)| v - z).collect())
    .collect();

  let extremes: Vec<Vec<Score>> = (0..objective_cnt)
    .filter_map(|axis| {
      translated
        .iter()
        .min_by(|a, b| asf(a, axis).total_cmp(&asf(b, axis)))
        .cloned()
    })
    .collect();
  let intercepts = hyperplane_intercepts(&extremes).unwrap_or_else(|| {
    trace!("degenerate extreme points, using objective maxima as intercepts");
    (0..objective_cnt)
      .map(|o| {
        let max = translated.iter().map(|p| p[o]).fold(0.0, Score::max);
        if max > 1e-10 {
          max
        } else {
          1.0
        }
      })
      .collect()
  });

  translated
    .into_iter()
    .map(|p| p.iter().zip(&intercepts).map(|(v, a)| v / a).collect())
    .collect()
}

/// NSGA-III environmental selection.
///
/// Owns its reference lattice and the random number generator that breaks
/// ties between equally crowded reference points. The same seed and the
/// same sequence of calls reproduce the same selections.
///
/// # Examples
/// ```
/// # use rand::{rngs::StdRng, SeedableRng};
/// # use moea_core::reference::{ReferenceLattice, ReferencePointSelection};
/// let lattice = ReferenceLattice::simplex(2, 4).unwrap();
/// let mut selection =
///   ReferencePointSelection::new(lattice, StdRng::seed_from_u64(7));
/// let population: Vec<Vec<f64>> = (0..10)
///   .map(|i| {
///     let x = i as f64 / 9.0;
///     vec![x, 1.0 - x]
///   })
///   .collect();
/// let survivors = selection.select_from(population, 5).unwrap();
/// assert_eq!(survivors.len(), 5);
/// ```
#[derive(Clone, Debug)]
pub struct ReferencePointSelection<R> {
  lattice: ReferenceLattice,
  rng: R,
}

impl<R: Rng> ReferencePointSelection<R> {
  /// Creates a selection over `lattice`, breaking ties with `rng`.
  pub fn new(lattice: ReferenceLattice, rng: R) -> Self {
    Self { lattice, rng }
  }

  /// Returns the reference lattice.
  pub fn lattice(&self) -> &ReferenceLattice {
    &self.lattice
  }

  /// Ranks `population` with [`FastNonDominatedRanking`] and selects
  /// `target_size` survivors from its fronts.
  ///
  /// # Errors
  ///
  /// Same as [`select`](Self::select).
  pub fn select_from<S: Evaluated>(
    &mut self,
    population: Vec<S>,
    target_size: usize,
  ) -> Result<Vec<S>> {
    let fronts = FastNonDominatedRanking::new()
      .compute_ranking(&population)
      .into_fronts(population);
    self.select(fronts, target_size)
  }

  /// Selects `target_size` survivors from `fronts`, best front first.
  /// Returns every solution if there are not more than `target_size` of
  /// them.
  ///
  /// # Errors
  ///
  /// Returns [`Error::DimensionMismatch`] if a solution has a different
  /// number of objectives than the lattice.
  pub fn select<S: Evaluated>(
    &mut self,
    fronts: Vec<Vec<S>>,
    target_size: usize,
  ) -> Result<Vec<S>> {
    for s in fronts.iter().flatten() {
      Error::check_dimension(
        self.lattice.objective_count(),
        s.objectives().len(),
      )?;
    }

    let mut selected = Vec::with_capacity(target_size);
    let mut fronts = fronts.into_iter();
    let pending = loop {
      match fronts.next() {
        None => return Ok(selected),
        Some(front) if selected.len() + front.len() <= target_size => {
          selected.extend(front)
        }
        Some(front) => break front,
      }
    };
    if selected.len() == target_size {
      return Ok(selected);
    }

    let picked = self.niche(&selected, &pending, target_size - selected.len());
    let mut pending: Vec<Option<S>> = pending.into_iter().map(Some).collect();
    selected.extend(picked.into_iter().filter_map(|idx| pending[idx].take()));
    Ok(selected)
  }

  /// Picks `count` indices of `pending` by niche preservation.
  fn niche<S: Evaluated>(
    &mut self,
    accepted: &[S],
    pending: &[S],
    count: usize,
  ) -> Vec<usize> {
    let objectives: Vec<&[Score]> = accepted
      .iter()
      .chain(pending)
      .map(|s| s.objectives())
      .collect();
    let associations: Vec<(usize, Score)> = normalize(&objectives)
      .iter()
      .map(|p| self.lattice.associate(p))
      .collect();
    let (accepted_assoc, pending_assoc) = associations.split_at(accepted.len());

    let mut niche_counts = vec![0usize; self.lattice.len()];
    for &(reference, _) in accepted_assoc {
      niche_counts[reference] += 1;
    }
    let mut candidates: Vec<Vec<(usize, Score)>> =
      vec![Vec::new(); self.lattice.len()];
    for (idx, &(reference, distance)) in pending_assoc.iter().enumerate() {
      candidates[reference].push((idx, distance));
    }
    debug!(
      "niching {count} of {} pending solutions over {} reference points",
      pending.len(),
      candidates.iter().filter(|c| !c.is_empty()).count()
    );

    let mut picked = Vec::with_capacity(count);
    while picked.len() < count {
      let Some(min_count) = (0..candidates.len())
        .filter(|&r| !candidates[r].is_empty())
        .map(|r| niche_counts[r])
        .min()
      else {
        break;
      };
      let least_crowded: Vec<usize> = (0..candidates.len())
        .filter(|&r| !candidates[r].is_empty() && niche_counts[r] == min_count)
        .collect();
      let reference = least_crowded[self.rng.gen_range(0..least_crowded.len())];

      let Some(closest) = candidates[reference]
        .iter()
        .position_min_by(|a, b| a.1.total_cmp(&b.1))
      else {
        break;
      };
      let (idx, _) = candidates[reference].remove(closest);
      niche_counts[reference] += 1;
      picked.push(idx);
    }
    picked
  }
}

//! Partitioning of solutions into ranked Pareto fronts.

use itertools::Itertools;

use crate::dominance::{ConstrainedDominance, Dominance};

/// Index of a solution in the ranked slice.
pub type SolutionIndex = usize;
/// Index of a front. The lower - the better.
pub type FrontIndex = usize;
/// Indices of solutions of one front.
pub type Front = Vec<SolutionIndex>;

// number of solutions dominating a solution
type DominanceCounter = usize;
// dominated by a solution solutions' indices
type DominanceList = Vec<SolutionIndex>;

/// Result of a ranking: fronts of solution indices in rank order and the
/// rank of every solution.
///
/// A `Ranking` is produced fresh for each generation and passed alongside
/// the ranked solutions, it never lives inside them.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Ranking {
  fronts: Vec<Front>,
  ranks: Vec<FrontIndex>,
}

impl Ranking {
  fn from_fronts(fronts: Vec<Front>, solution_cnt: usize) -> Self {
    let mut ranks = vec![FrontIndex::MAX; solution_cnt];
    for (front_idx, front) in fronts.iter().enumerate() {
      for &s_idx in front {
        debug_assert_eq!(
          ranks[s_idx],
          FrontIndex::MAX,
          "solution {s_idx} was assigned to two fronts"
        );
        ranks[s_idx] = front_idx;
      }
    }
    debug_assert!(
      ranks.iter().all(|&r| r != FrontIndex::MAX),
      "every solution must belong to a front"
    );
    debug_assert!(
      fronts.iter().all(|f| !f.is_empty()),
      "fronts must not be empty"
    );
    Self { fronts, ranks }
  }

  /// Returns fronts in rank order. Front 0 is the non-dominated set.
  pub fn fronts(&self) -> &[Front] {
    &self.fronts
  }

  /// Returns the front at `rank`, if any.
  pub fn front(&self, rank: FrontIndex) -> Option<&[SolutionIndex]> {
    self.fronts.get(rank).map(Vec::as_slice)
  }

  /// Returns the number of fronts.
  pub fn front_count(&self) -> usize {
    self.fronts.len()
  }

  /// Returns the rank of solution at `idx`.
  ///
  /// # Panics
  ///
  /// Panics if `idx` is out of range of the ranked solutions.
  pub fn rank(&self, idx: SolutionIndex) -> FrontIndex {
    self.ranks[idx]
  }

  /// Returns ranks of all solutions in input order.
  pub fn ranks(&self) -> &[FrontIndex] {
    &self.ranks
  }

  /// Moves ranked solutions into their fronts, preserving in-front order.
  ///
  /// # Panics
  ///
  /// Panics if `solutions` is not the slice this ranking was computed for.
  pub fn into_fronts<S>(self, solutions: Vec<S>) -> Vec<Vec<S>> {
    assert_eq!(
      solutions.len(),
      self.ranks.len(),
      "ranking was computed for a different number of solutions"
    );
    let mut some_solutions: Vec<_> = solutions.into_iter().map(Some).collect();
    self
      .fronts
      .into_iter()
      .map(|front| {
        front
          .into_iter()
          .filter_map(|idx| some_solutions[idx].take())
          .collect()
      })
      .collect()
  }
}

/// Computes a [`Ranking`] of a set of solutions.
pub trait RankingStrategy<S> {
  /// Ranks `solutions`, covering each of them exactly once.
  fn compute_ranking(&self, solutions: &[S]) -> Ranking;
}

/// Fast non-dominated sorting by Deb et al. in `O(M * N^2)`.
///
/// Iteration order over fronts and within a front follows input order. Ties
/// are never broken here, that is the job of a diversity estimator.
///
/// # Examples
/// ```
/// # use moea_core::ranking::{FastNonDominatedRanking, RankingStrategy};
/// let points: Vec<Vec<f64>> =
///   vec![vec![1.0, 5.0], vec![2.0, 4.0], vec![3.0, 3.0], vec![5.0, 1.0]];
/// let ranking = FastNonDominatedRanking::new().compute_ranking(&points);
/// assert_eq!(ranking.front_count(), 1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct FastNonDominatedRanking<D = ConstrainedDominance> {
  dominance: D,
}

impl FastNonDominatedRanking {
  /// Creates a ranking based on [`ConstrainedDominance`].
  pub fn new() -> Self {
    Self::default()
  }
}

impl<D> FastNonDominatedRanking<D> {
  /// Creates a ranking based on given dominance relation.
  pub fn with_dominance(dominance: D) -> Self {
    Self { dominance }
  }
}

impl<S, D: Dominance<S>> RankingStrategy<S> for FastNonDominatedRanking<D> {
  fn compute_ranking(&self, solutions: &[S]) -> Ranking {
    let mut dominance_lists: Vec<DominanceList> =
      vec![Vec::new(); solutions.len()];
    let mut dominance_counters: Vec<DominanceCounter> =
      vec![0; solutions.len()];

    // for each unique pair of solutions `p` and `q`...
    for ((p_idx, p), (q_idx, q)) in
      solutions.iter().enumerate().tuple_combinations()
    {
      match self.dominance.compare(p, q) {
        // if solution `p` dominates solution `q`...
        std::cmp::Ordering::Less => {
          // put solution `q` into list of solutions dominated by `p`
          dominance_lists[p_idx].push(q_idx);
          // and increment counter of solutions dominating `q`
          dominance_counters[q_idx] += 1;
        }
        // if solution `q` dominates solution `p`...
        std::cmp::Ordering::Greater => {
          dominance_lists[q_idx].push(p_idx);
          dominance_counters[p_idx] += 1;
        }
        std::cmp::Ordering::Equal => {}
      }
    }

    // solutions dominated by nobody form the first front
    let mut fronts: Vec<Front> = Vec::new();
    let mut current_front: Front = (0..solutions.len())
      .filter(|&idx| dominance_counters[idx] == 0)
      .collect();

    while !current_front.is_empty() {
      let mut next_front = Front::new();
      // for each solution `p` in current front...
      for &p_idx in &current_front {
        // for each solution `q` dominated by `p`...
        for &q_idx in &dominance_lists[p_idx] {
          dominance_counters[q_idx] -= 1;
          // if no more solutions dominate `q`, it belongs to the next front
          if dominance_counters[q_idx] == 0 {
            next_front.push(q_idx);
          }
        }
      }
      fronts.push(current_front);
      current_front = next_front;
    }

    Ranking::from_fronts(fronts, solutions.len())
  }
}

/// Ranking by SPEA2 raw fitness.
///
/// The strength of a solution is the number of solutions it dominates, its
/// raw fitness is the sum of strengths of all solutions dominating it.
/// Solutions of equal raw fitness share a front, fronts are ordered by
/// ascending raw fitness, so front 0 is the non-dominated set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct StrengthRanking<D = ConstrainedDominance> {
  dominance: D,
}

impl StrengthRanking {
  /// Creates a ranking based on [`ConstrainedDominance`].
  pub fn new() -> Self {
    Self::default()
  }
}

impl<D> StrengthRanking<D> {
  /// Creates a ranking based on given dominance relation.
  pub fn with_dominance(dominance: D) -> Self {
    Self { dominance }
  }
}

/// Number of solutions dominated by a solution.
type StrengthValue = usize;
/// Sum of strength values of dominating solutions.
type RawFitness = usize;

impl<S, D: Dominance<S>> RankingStrategy<S> for StrengthRanking<D> {
  fn compute_ranking(&self, solutions: &[S]) -> Ranking {
    let mut strengths: Vec<StrengthValue> = vec![0; solutions.len()];
    let mut dominators: Vec<DominanceList> = vec![Vec::new(); solutions.len()];

    for ((p_idx, p), (q_idx, q)) in
      solutions.iter().enumerate().tuple_combinations()
    {
      match self.dominance.compare(p, q) {
        std::cmp::Ordering::Less => {
          strengths[p_idx] += 1;
          dominators[q_idx].push(p_idx);
        }
        std::cmp::Ordering::Greater => {
          strengths[q_idx] += 1;
          dominators[p_idx].push(q_idx);
        }
        std::cmp::Ordering::Equal => {}
      }
    }

    let raw_fitness: Vec<RawFitness> = dominators
      .iter()
      .map(|ds| ds.iter().map(|&d_idx| strengths[d_idx]).sum())
      .collect();

    let fronts = (0..solutions.len())
      .into_group_map_by(|&idx| raw_fitness[idx])
      .into_iter()
      .sorted_unstable_by_key(|(fitness, _)| *fitness)
      .map(|(_, mut front)| {
        front.sort_unstable();
        front
      })
      .collect();

    Ranking::from_fronts(fronts, solutions.len())
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use proptest::prelude::*;

  use super::*;
  use crate::dominance::UnconstrainedDominance;

  fn points(raw: &[(f64, f64)]) -> Vec<Vec<f64>> {
    raw.iter().map(|&(a, b)| vec![a, b]).collect()
  }

  #[test]
  fn test_hand_built_fronts() {
    let solutions =
      points(&[(1.0, 5.0), (2.0, 4.0), (3.0, 3.0), (5.0, 1.0), (3.0, 2.0)]);
    let ranking = FastNonDominatedRanking::new().compute_ranking(&solutions);
    assert_eq!(ranking.fronts(), &[vec![0, 1, 3, 4], vec![2]]);
    assert_eq!(ranking.ranks(), &[0, 0, 1, 0, 0]);
    assert_eq!(ranking.rank(2), 1);
  }

  #[test]
  fn test_empty_input() {
    let ranking =
      FastNonDominatedRanking::new().compute_ranking(&Vec::<Vec<f64>>::new());
    assert_eq!(ranking.front_count(), 0);
    assert!(ranking.front(0).is_none());
  }

  #[test]
  fn test_mutually_non_dominated_input() {
    let solutions = points(&[(1.0, 4.0), (2.0, 3.0), (3.0, 2.0), (4.0, 1.0)]);
    let ranking = FastNonDominatedRanking::new().compute_ranking(&solutions);
    assert_eq!(ranking.fronts(), &[vec![0, 1, 2, 3]]);
  }

  #[test]
  fn test_chain_of_fronts() {
    let solutions = points(&[(3.0, 3.0), (1.0, 1.0), (2.0, 2.0), (4.0, 4.0)]);
    let ranking = FastNonDominatedRanking::new().compute_ranking(&solutions);
    assert_eq!(ranking.fronts(), &[vec![1], vec![2], vec![0], vec![3]]);
  }

  #[test]
  fn test_equal_solutions_share_front() {
    let solutions = points(&[(1.0, 1.0), (1.0, 1.0), (2.0, 2.0)]);
    let ranking = FastNonDominatedRanking::with_dominance(UnconstrainedDominance)
      .compute_ranking(&solutions);
    assert_eq!(ranking.fronts(), &[vec![0, 1], vec![2]]);
  }

  #[test]
  fn test_into_fronts() {
    let solutions =
      points(&[(1.0, 5.0), (2.0, 4.0), (3.0, 3.0), (5.0, 1.0), (3.0, 2.0)]);
    let ranking = FastNonDominatedRanking::new().compute_ranking(&solutions);
    let fronts = ranking.into_fronts(solutions);
    assert_eq!(fronts.len(), 2);
    assert_eq!(fronts[1], vec![vec![3.0, 3.0]]);
    assert_eq!(fronts[0][3], vec![3.0, 2.0]);
  }

  #[test]
  fn test_strength_ranking() {
    // (1, 1) dominates everything, (2, 2) dominates (3, 3) and (4, 4)
    let solutions = points(&[(4.0, 4.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
    let ranking = StrengthRanking::new().compute_ranking(&solutions);
    // raw fitness: (1,1) -> 0, (2,2) -> 3, (3,3) -> 3 + 2, (4,4) -> 3 + 2 + 1
    assert_eq!(ranking.fronts(), &[vec![1], vec![2], vec![3], vec![0]]);
  }

  #[test]
  fn test_strength_ranking_groups_equal_raw_fitness() {
    let solutions = points(&[(1.0, 3.0), (3.0, 1.0), (2.0, 4.0), (4.0, 2.0)]);
    let ranking = StrengthRanking::new().compute_ranking(&solutions);
    // (2,4) is dominated by (1,3) only, (4,2) by (3,1) only; both have
    // raw fitness 1
    assert_eq!(ranking.fronts(), &[vec![0, 1], vec![2, 3]]);
  }

  proptest! {
    #[test]
    fn prop_ranking_is_a_partition(
      raw in prop::collection::vec((0u8..6, 0u8..6, 0u8..6), 0..40)
    ) {
      let solutions: Vec<Vec<f64>> = raw
        .iter()
        .map(|&(a, b, c)| vec![a.into(), b.into(), c.into()])
        .collect();
      let dominance = UnconstrainedDominance;
      let ranking = FastNonDominatedRanking::with_dominance(dominance)
        .compute_ranking(&solutions);

      let covered: Vec<usize> =
        ranking.fronts().iter().flatten().copied().collect();
      prop_assert_eq!(covered.len(), solutions.len());
      prop_assert_eq!(
        covered.iter().collect::<HashSet<_>>().len(),
        solutions.len()
      );

      for (rank, front) in ranking.fronts().iter().enumerate() {
        for &p in front {
          for &q in front {
            prop_assert!(!dominance.dominates(&solutions[p], &solutions[q]));
          }
          if rank > 0 {
            let previous = &ranking.fronts()[rank - 1];
            prop_assert!(previous
              .iter()
              .any(|&d| dominance.dominates(&solutions[d], &solutions[p])));
          }
        }
      }
    }
  }
}

//! Dominance relations between evaluated solutions.
//!
//! A dominance relation compares two solutions and returns an [`Ordering`]:
//! - `Less` if the first solution dominates the second,
//! - `Greater` if the second solution dominates the first,
//! - `Equal` if neither dominates the other. Note that `Equal` does **not**
//!   mean the solutions are equal, only that they are incomparable.

use std::cmp::Ordering;

use crate::{score::ParetoDominance, solution::Evaluated};

/// A pairwise dominance relation. Rankings and archives are parameterized by
/// it.
///
/// Implemented for closures of type `Fn(&S, &S) -> Ordering`.
///
/// # Examples
/// ```
/// # use std::cmp::Ordering;
/// # use moea_core::dominance::Dominance;
/// // compares solutions by their first objective only
/// let by_first = |a: &Vec<f64>, b: &Vec<f64>| {
///   a[0].partial_cmp(&b[0]).unwrap_or(Ordering::Equal)
/// };
/// assert_eq!(by_first.compare(&vec![1.0, 9.0], &vec![2.0, 0.0]), Ordering::Less);
/// ```
pub trait Dominance<S> {
  /// Returns `Less` if `a` dominates `b`, `Greater` if `b` dominates `a`,
  /// otherwise `Equal`.
  fn compare(&self, a: &S, b: &S) -> Ordering;

  /// Returns `true` if `a` dominates `b`.
  fn dominates(&self, a: &S, b: &S) -> bool {
    self.compare(a, b) == Ordering::Less
  }
}

impl<S, F> Dominance<S> for F
where
  F: Fn(&S, &S) -> Ordering,
{
  fn compare(&self, a: &S, b: &S) -> Ordering {
    self(a, b)
  }
}

/// Two-tier dominance: the solution with the strictly lower constraint
/// violation dominates regardless of objectives. Only when violations are
/// equal, including both solutions being feasible, Pareto dominance over
/// objective values decides.
///
/// This is the default relation of every ranking and archive of the crate.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ConstrainedDominance;

impl<S: Evaluated> Dominance<S> for ConstrainedDominance {
  fn compare(&self, a: &S, b: &S) -> Ordering {
    let (a_cv, b_cv) = (a.constraint_violation(), b.constraint_violation());
    if a_cv < b_cv {
      Ordering::Less
    } else if b_cv < a_cv {
      Ordering::Greater
    } else {
      a.objectives().dominance(b.objectives())
    }
  }
}

/// Plain Pareto dominance over objective values, ignoring constraint
/// violations. Suits problems without constraints.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct UnconstrainedDominance;

impl<S: Evaluated> Dominance<S> for UnconstrainedDominance {
  fn compare(&self, a: &S, b: &S) -> Ordering {
    a.objectives().dominance(b.objectives())
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;
  use crate::solution::Solution;

  fn solution(objectives: &[f64], violation: f64) -> Solution<()> {
    Solution::new((), objectives.to_vec()).with_violation(violation)
  }

  #[test]
  fn test_constrained_dominance_prefers_lower_violation() {
    let feasible = solution(&[10.0, 10.0], 0.0);
    let infeasible = solution(&[1.0, 1.0], 0.5);
    assert_eq!(
      ConstrainedDominance.compare(&feasible, &infeasible),
      Ordering::Less
    );
    assert_eq!(
      ConstrainedDominance.compare(&infeasible, &feasible),
      Ordering::Greater
    );

    let less_infeasible = solution(&[5.0, 5.0], 0.1);
    assert!(ConstrainedDominance.dominates(&less_infeasible, &infeasible));
  }

  #[test]
  fn test_constrained_dominance_equal_violation_uses_objectives() {
    let a = solution(&[1.0, 2.0], 0.3);
    let b = solution(&[2.0, 2.0], 0.3);
    let c = solution(&[0.0, 3.0], 0.3);
    assert_eq!(ConstrainedDominance.compare(&a, &b), Ordering::Less);
    assert_eq!(ConstrainedDominance.compare(&a, &c), Ordering::Equal);
    assert_eq!(ConstrainedDominance.compare(&a, &a), Ordering::Equal);
  }

  #[test]
  fn test_unconstrained_dominance_ignores_violation() {
    let a = solution(&[1.0, 1.0], 9.0);
    let b = solution(&[2.0, 2.0], 0.0);
    assert_eq!(UnconstrainedDominance.compare(&a, &b), Ordering::Less);
  }

  #[test]
  fn test_dominance_from_closure() {
    fn takes_dominance<D: Dominance<Vec<f64>>>(d: &D) -> Ordering {
      d.compare(&vec![1.0], &vec![2.0])
    }
    let reversed = |a: &Vec<f64>, b: &Vec<f64>| b[0].total_cmp(&a[0]);
    assert_eq!(takes_dominance(&reversed), Ordering::Greater);
    assert_eq!(takes_dominance(&UnconstrainedDominance), Ordering::Less);
  }

  proptest! {
    #[test]
    fn prop_dominance_is_antisymmetric(
      a in prop::collection::vec(-10.0..10.0f64, 3),
      b in prop::collection::vec(-10.0..10.0f64, 3),
      a_cv in prop::sample::select(vec![0.0, 0.5, 1.0]),
      b_cv in prop::sample::select(vec![0.0, 0.5, 1.0]),
    ) {
      let a = solution(&a, a_cv);
      let b = solution(&b, b_cv);
      let ab = ConstrainedDominance.compare(&a, &b);
      let ba = ConstrainedDominance.compare(&b, &a);
      prop_assert_eq!(ab, ba.reverse());
    }
  }
}

//! Solutions, the `Evaluated` view the core works with, and the `Problem`
//! seam through which solutions get their objective values.

use crate::score::Score;

/// Anything that carries a vector of objective values and a constraint
/// violation degree.
///
/// Every ranking, estimator, archive and selection of this crate is generic
/// over this trait, so you can feed it [`Solution`]s, your own types, or bare
/// objective vectors.
///
/// # Examples
/// ```
/// # use moea_core::solution::Evaluated;
/// let point: Vec<f64> = vec![1.0, 2.0];
/// assert_eq!(point.objectives(), &[1.0, 2.0]);
/// assert_eq!(point.constraint_violation(), 0.0);
/// ```
pub trait Evaluated {
  /// Returns objective values. Lower is better.
  fn objectives(&self) -> &[Score];

  /// Returns the constraint violation degree. `0.0` means feasible, lower is
  /// better.
  fn constraint_violation(&self) -> Score {
    0.0
  }
}

impl Evaluated for Vec<Score> {
  fn objectives(&self) -> &[Score] {
    self
  }
}

impl<const N: usize> Evaluated for [Score; N] {
  fn objectives(&self) -> &[Score] {
    self
  }
}

impl<T: Evaluated + ?Sized> Evaluated for &T {
  fn objectives(&self) -> &[Score] {
    (**self).objectives()
  }

  fn constraint_violation(&self) -> Score {
    (**self).constraint_violation()
  }
}

/// A candidate solution: a decision value owned by the caller plus its
/// objective values and constraint violation degree.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution<D> {
  decision: D,
  objectives: Vec<Score>,
  violation: Score,
}

impl<D> Solution<D> {
  /// Creates a feasible solution with all `objective_cnt` objective values
  /// set to `+inf`, waiting to be evaluated by a [`Problem`].
  pub fn unevaluated(decision: D, objective_cnt: usize) -> Self {
    Self {
      decision,
      objectives: vec![Score::INFINITY; objective_cnt],
      violation: 0.0,
    }
  }

  /// Creates an already evaluated, feasible solution.
  pub fn new(decision: D, objectives: Vec<Score>) -> Self {
    Self {
      decision,
      objectives,
      violation: 0.0,
    }
  }

  /// Sets the constraint violation degree.
  pub fn with_violation(mut self, violation: Score) -> Self {
    self.violation = violation;
    self
  }

  /// Returns a reference to the decision value.
  pub fn decision(&self) -> &D {
    &self.decision
  }

  /// Returns a mutable reference to the decision value.
  ///
  /// Objective values become stale after a decision changes, reevaluate
  /// the solution before ranking it again.
  pub fn decision_mut(&mut self) -> &mut D {
    &mut self.decision
  }

  /// Consumes the solution, returning its decision value.
  pub fn into_decision(self) -> D {
    self.decision
  }

  /// Returns a mutable slice of objective values, to be filled in by
  /// [`Problem::evaluate`].
  pub fn objectives_mut(&mut self) -> &mut [Score] {
    &mut self.objectives
  }

  /// Overwrites the constraint violation degree.
  pub fn set_violation(&mut self, violation: Score) {
    self.violation = violation;
  }

  /// Returns `true` if the solution violates no constraint.
  pub fn is_feasible(&self) -> bool {
    self.violation <= 0.0
  }
}

impl<D> Evaluated for Solution<D> {
  fn objectives(&self) -> &[Score] {
    &self.objectives
  }

  fn constraint_violation(&self) -> Score {
    self.violation
  }
}

/// A multi-objective problem: knows how many objectives it has and fills in
/// a solution's objective values and constraint violation degree.
///
/// Implemented for closures of type `Fn(&D) -> Vec<f64>` (unconstrained
/// problems) paired with their objective count.
///
/// # Examples
/// ```
/// # use moea_core::solution::{Evaluated, Problem, Solution};
/// // Schaffer's problem No. 1
/// let problem = (2, |x: &f64| vec![x.powi(2), (x - 2.0).powi(2)]);
/// let mut solution = Solution::unevaluated(1.0, problem.objective_count());
/// problem.evaluate(&mut solution);
/// assert_eq!(solution.objectives(), &[1.0, 1.0]);
/// ```
pub trait Problem<D> {
  /// Number of objectives every evaluated solution will carry.
  fn objective_count(&self) -> usize;

  /// Writes objective values and, for constrained problems, the violation
  /// degree into `solution`.
  fn evaluate(&self, solution: &mut Solution<D>);
}

impl<D, F> Problem<D> for (usize, F)
where
  F: Fn(&D) -> Vec<Score>,
{
  fn objective_count(&self) -> usize {
    self.0
  }

  fn evaluate(&self, solution: &mut Solution<D>) {
    let objectives = (self.1)(&solution.decision);
    debug_assert_eq!(
      objectives.len(),
      self.0,
      "problem returned an unexpected number of objectives"
    );
    solution.objectives = objectives;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_unevaluated_solution() {
    let solution = Solution::unevaluated((), 3);
    assert_eq!(solution.objectives(), &[f64::INFINITY; 3]);
    assert!(solution.is_feasible());
  }

  #[test]
  fn test_violation() {
    let solution = Solution::new('a', vec![1.0]).with_violation(0.5);
    assert_eq!(solution.constraint_violation(), 0.5);
    assert!(!solution.is_feasible());
    assert_eq!((&solution).constraint_violation(), 0.5);
  }

  #[test]
  fn test_problem_from_closure() {
    let problem = (2, |x: &f64| vec![*x, -x]);
    let mut solution = Solution::unevaluated(3.0, problem.objective_count());
    problem.evaluate(&mut solution);
    assert_eq!(solution.objectives(), &[3.0, -3.0]);
    assert_eq!(solution.into_decision(), 3.0);
  }

  #[test]
  fn test_custom_problem() {
    struct Constrained;
    impl Problem<(f64, f64)> for Constrained {
      fn objective_count(&self) -> usize {
        2
      }

      fn evaluate(&self, solution: &mut Solution<(f64, f64)>) {
        let (x, y) = *solution.decision();
        solution.objectives_mut().copy_from_slice(&[x + y, x - y]);
        solution.set_violation((x - 1.0).max(0.0));
      }
    }

    let mut solution = Solution::unevaluated((2.0, 1.0), 2);
    Constrained.evaluate(&mut solution);
    assert_eq!(solution.objectives(), &[3.0, 1.0]);
    assert_eq!(solution.constraint_violation(), 1.0);
  }
}

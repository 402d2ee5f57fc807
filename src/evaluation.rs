//! Evaluation of solutions against a [`Problem`].
//!
//! Evaluation is the only stage of the crate that runs in parallel. An
//! evaluator returns only once the whole batch has been evaluated, so
//! solutions can be handed to rankings and archives right after the call.

use log::debug;
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};

use crate::{
  error::Result,
  solution::{Problem, Solution},
};

/// Fills in objective values of a batch of solutions.
pub trait Evaluator<D, P: Problem<D>> {
  /// Evaluates every solution of `solutions` with `problem`.
  fn evaluate_all(&self, problem: &P, solutions: &mut [Solution<D>]);
}

/// Evaluates solutions one after another on the calling thread.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct SequentialEvaluator;

impl<D, P: Problem<D>> Evaluator<D, P> for SequentialEvaluator {
  fn evaluate_all(&self, problem: &P, solutions: &mut [Solution<D>]) {
    solutions.iter_mut().for_each(|s| problem.evaluate(s));
  }
}

/// How a [`ParallelEvaluator`] splits a batch between its threads.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Parallelism {
  /// Every solution is a separate task.
  #[default]
  Each,
  /// The batch is split into one chunk per thread. Suits cheap problems,
  /// where per-task overhead would dominate.
  Batch,
}

/// Evaluates solutions on a dedicated, bounded [rayon] thread pool.
///
/// **For cheap problems, parallelization may only decrease performance
/// because of the additional overhead. Benchmark if in doubt.**
///
/// # Examples
/// ```
/// # use moea_core::{evaluation::*, solution::*};
/// let problem = (2, |x: &f64| vec![x.powi(2), (x - 2.0).powi(2)]);
/// let mut solutions: Vec<_> =
///   (0..8).map(|i| Solution::unevaluated(i as f64, 2)).collect();
/// let evaluator = ParallelEvaluator::new(2).unwrap();
/// evaluator.evaluate_all(&problem, &mut solutions);
/// assert_eq!(solutions[3].objectives(), &[9.0, 1.0]);
/// ```
#[derive(Debug)]
pub struct ParallelEvaluator {
  pool: ThreadPool,
  parallelism: Parallelism,
}

impl ParallelEvaluator {
  /// Creates an evaluator with a pool of `threads` threads. `0` lets rayon
  /// pick the number of threads.
  ///
  /// # Errors
  ///
  /// Returns [`Error::ThreadPool`](crate::Error::ThreadPool) if the pool
  /// could not be built.
  pub fn new(threads: usize) -> Result<Self> {
    let pool = ThreadPoolBuilder::new()
      .num_threads(threads)
      .thread_name(|idx| format!("moea-eval-{idx}"))
      .build()?;
    debug!(
      "built evaluation pool with {} threads",
      pool.current_num_threads()
    );
    Ok(Self {
      pool,
      parallelism: Parallelism::default(),
    })
  }

  /// Sets how batches are split between threads.
  pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
    self.parallelism = parallelism;
    self
  }

  /// Returns the number of threads of the pool.
  pub fn thread_count(&self) -> usize {
    self.pool.current_num_threads()
  }

  /// Returns how batches are split between threads.
  pub fn parallelism(&self) -> Parallelism {
    self.parallelism
  }
}

impl<D, P> Evaluator<D, P> for ParallelEvaluator
where
  D: Send,
  P: Problem<D> + Sync,
{
  fn evaluate_all(&self, problem: &P, solutions: &mut [Solution<D>]) {
    match self.parallelism {
      Parallelism::Each => self.pool.install(|| {
        solutions.par_iter_mut().for_each(|s| problem.evaluate(s));
      }),
      Parallelism::Batch => {
        let chunk_size = (solutions.len() / self.thread_count()).max(1);
        self.pool.install(|| {
          solutions.par_chunks_mut(chunk_size).for_each(|chunk| {
            chunk.iter_mut().for_each(|s| problem.evaluate(s))
          });
        })
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::solution::Evaluated;

  struct Counted {
    evaluations: AtomicUsize,
  }

  impl Problem<u32> for Counted {
    fn objective_count(&self) -> usize {
      2
    }

    fn evaluate(&self, solution: &mut Solution<u32>) {
      self.evaluations.fetch_add(1, Ordering::Relaxed);
      let x = *solution.decision() as f64;
      solution.objectives_mut().copy_from_slice(&[x, -x]);
      solution.set_violation(if x > 10.0 { x - 10.0 } else { 0.0 });
    }
  }

  fn batch(problem: &Counted) -> Vec<Solution<u32>> {
    (0..50)
      .map(|x| Solution::unevaluated(x, problem.objective_count()))
      .collect()
  }

  fn takes_evaluator<E: Evaluator<u32, Counted>>(
    evaluator: &E,
  ) -> Vec<Solution<u32>> {
    let problem = Counted {
      evaluations: AtomicUsize::new(0),
    };
    let mut solutions = batch(&problem);
    evaluator.evaluate_all(&problem, &mut solutions);
    assert_eq!(problem.evaluations.load(Ordering::Relaxed), solutions.len());
    solutions
  }

  #[test]
  fn test_sequential_evaluator() {
    let solutions = takes_evaluator(&SequentialEvaluator);
    assert_eq!(solutions[7].objectives(), &[7.0, -7.0]);
    assert_eq!(solutions[12].constraint_violation(), 2.0);
  }

  #[test]
  fn test_parallel_evaluators_match_sequential() {
    let expected = takes_evaluator(&SequentialEvaluator);
    for parallelism in [Parallelism::Each, Parallelism::Batch] {
      let evaluator = ParallelEvaluator::new(3)
        .unwrap()
        .with_parallelism(parallelism);
      assert_eq!(evaluator.thread_count(), 3);
      assert_eq!(evaluator.parallelism(), parallelism);
      assert_eq!(takes_evaluator(&evaluator), expected);
    }
  }

  #[test]
  fn test_empty_batch() {
    let problem = (1, |x: &f64| vec![*x]);
    let mut solutions: Vec<Solution<f64>> = Vec::new();
    let evaluator = ParallelEvaluator::new(2)
      .unwrap()
      .with_parallelism(Parallelism::Batch);
    evaluator.evaluate_all(&problem, &mut solutions);
    SequentialEvaluator.evaluate_all(&problem, &mut solutions);
    assert!(solutions.is_empty());
  }
}

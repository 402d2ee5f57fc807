//! **moea-core** is the Pareto ranking and archiving engine shared by
//! multi-objective evolutionary algorithms: NSGA-II/III, SPEA2, SMS-EMOA,
//! IBEA, ESPEA and their relatives. It does not run an algorithm loop
//! itself. It answers the three questions every such loop asks on every
//! generation:
//! 1. Which solutions are better than which? (**ranking**)
//! 2. Which of equally good solutions are worth keeping? (**diversity
//!    estimation**)
//! 3. What is the best set of trade-offs found so far? (**archives**)
//!
//! Here's a [quick start example](#example) for the impatient.
//!
//! # Solutions
//!
//! Every objective is **minimized**. The crate never looks at decision
//! values, only at objective vectors and constraint violation degrees
//! exposed through the [`Evaluated`] trait. It is implemented for
//! [`Solution`], a decision value of any type paired with its objective
//! values, and for bare `Vec<f64>` and `[f64; N]` objective vectors, which
//! are handy in tests and post-processing.
//!
//! A [`Problem`] fills in objective values of a [`Solution`]. The only part
//! of the crate that runs in parallel is evaluation: a [`ParallelEvaluator`]
//! evaluates a batch of solutions on its own bounded [rayon] thread pool and
//! returns once the whole batch is done.
//!
//! # Dominance and ranking
//!
//! A [`Dominance`] relation compares two solutions. The default,
//! [`ConstrainedDominance`], prefers the lower constraint violation and falls
//! back to Pareto dominance over objectives. Closures of type
//! `Fn(&S, &S) -> Ordering` are relations too.
//!
//! A [`RankingStrategy`] partitions solutions into **fronts**: front 0 holds
//! the solutions nobody dominates, front 1 those only dominated by front 0,
//! and so on. [`FastNonDominatedRanking`] is Deb's non-dominated sorting,
//! [`StrengthRanking`] ranks by SPEA2 raw fitness.
//!
//! # Diversity estimation
//!
//! A [`DiversityEstimator`] scores the members of a front, higher is more
//! valuable, and tells which ones to evict first:
//!
//! | Estimator                      | Algorithm | Eviction                      |
//! |:-------------------------------|:---------:|:-----------------------------:|
//! | [`CrowdingDistance`]           | NSGA-II   | recomputed after each eviction |
//! | [`HypervolumeContribution`]    | SMS-EMOA  | recomputed after each eviction |
//! | [`IndicatorPotential`]         | IBEA      | incremental                   |
//! | [`ElectrostaticEnergy`]        | ESPEA     | incremental                   |
//! | [`NearestNeighborDistance`]    | SPEA2     | recomputed after each eviction |
//!
//! The [`Hypervolume`] indicator behind [`HypervolumeContribution`] is also
//! exposed on its own, together with a [`NormalizedHypervolume`] for
//! comparing fronts against a reference front read with [`read_front`].
//!
//! # Archives
//!
//! An [`Archive`] holds mutually non-dominated solutions under continuous
//! insertion. [`NonDominatedArchive`] is unbounded, [`BoundedArchive`]
//! prunes itself back to its capacity with an estimator after every
//! insertion. [`CrowdingDistanceArchive`] and friends are aliases for the
//! usual estimator choices.
//!
//! For many objectives, [`ReferencePointSelection`] performs the NSGA-III
//! environmental selection over a [`ReferenceLattice`] instead.
//!
//! # Example
//!
//! Here's an archive of trade-offs for the textbook *Schaffer's Problem
//! No.1*: minimize `f1(x) = x^2` and `f2(x) = (x - 2)^2`.
//! ```
//! use moea_core::{
//!   archive::{Archive, CrowdingDistanceArchive},
//!   evaluation::{Evaluator, SequentialEvaluator},
//!   hypervolume::Hypervolume,
//!   solution::{Problem, Solution},
//! };
//!
//! let problem = (2, |x: &f64| vec![x.powi(2), (x - 2.0).powi(2)]);
//! // candidates between -1 and 3
//! let mut candidates: Vec<_> = (0..=40)
//!   .map(|i| -1.0 + i as f64 * 0.1)
//!   .map(|x| Solution::unevaluated(x, problem.objective_count()))
//!   .collect();
//! SequentialEvaluator.evaluate_all(&problem, &mut candidates);
//!
//! // keep at most 10 well spread Pareto optimal solutions
//! let mut archive = CrowdingDistanceArchive::with_capacity(10).unwrap();
//! for candidate in candidates {
//!   archive.add(candidate);
//! }
//! assert_eq!(archive.size(), 10);
//! // Pareto optimal solutions of this problem lie between 0 and 2
//! assert!(archive
//!   .solutions()
//!   .iter()
//!   .all(|s| (-1e-9..=2.0 + 1e-9).contains(s.decision())));
//!
//! let volume = Hypervolume.compute(archive.solutions(), &[4.0, 4.0]).unwrap();
//! assert!(volume > 0.0);
//! ```
//!
//! More runnable programs live in the *demos* folder in the root of the
//! project.
//!
//! # Logging
//!
//! The crate logs through the [log] facade: archive evictions, niching and
//! pool construction at `debug` level, rejected candidates and numeric
//! fallbacks at `trace` level. It never installs a logger.
//!
//! # Common pitfalls
//!
//! - Objectives are minimized. Negate the objectives you want to maximize.
//! - Hypervolume is exponential in the number of objectives. A
//!   [`HypervolumeArchive`] over more than 5-6 objectives will be slow.
//! - `NaN` objective values make a pair of solutions incomparable. They
//!   won't corrupt rankings or archives but they won't be pruned either.
//!   Filter them out during evaluation.
//!
//! [`Evaluated`]: crate::solution::Evaluated
//! [`Solution`]: crate::solution::Solution
//! [`Problem`]: crate::solution::Problem
//! [`ParallelEvaluator`]: crate::evaluation::ParallelEvaluator
//! [`Dominance`]: crate::dominance::Dominance
//! [`ConstrainedDominance`]: crate::dominance::ConstrainedDominance
//! [`RankingStrategy`]: crate::ranking::RankingStrategy
//! [`FastNonDominatedRanking`]: crate::ranking::FastNonDominatedRanking
//! [`StrengthRanking`]: crate::ranking::StrengthRanking
//! [`DiversityEstimator`]: crate::estimator::DiversityEstimator
//! [`CrowdingDistance`]: crate::estimator::CrowdingDistance
//! [`HypervolumeContribution`]: crate::estimator::HypervolumeContribution
//! [`IndicatorPotential`]: crate::estimator::IndicatorPotential
//! [`ElectrostaticEnergy`]: crate::estimator::ElectrostaticEnergy
//! [`NearestNeighborDistance`]: crate::estimator::NearestNeighborDistance
//! [`Hypervolume`]: crate::hypervolume::Hypervolume
//! [`NormalizedHypervolume`]: crate::hypervolume::NormalizedHypervolume
//! [`read_front`]: crate::front::read_front
//! [`Archive`]: crate::archive::Archive
//! [`NonDominatedArchive`]: crate::archive::NonDominatedArchive
//! [`BoundedArchive`]: crate::archive::BoundedArchive
//! [`CrowdingDistanceArchive`]: crate::archive::CrowdingDistanceArchive
//! [`HypervolumeArchive`]: crate::archive::HypervolumeArchive
//! [`ReferencePointSelection`]: crate::reference::ReferencePointSelection
//! [`ReferenceLattice`]: crate::reference::ReferenceLattice

#![warn(missing_docs)]

pub mod archive;
pub mod dominance;
mod error;
pub mod estimator;
pub mod evaluation;
pub mod front;
pub mod hypervolume;
pub mod ranking;
pub mod reference;
pub mod score;
pub mod solution;

pub use error::{Error, Result};

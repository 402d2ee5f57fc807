use std::f64::consts::FRAC_PI_2;

use log::info;
use moea_core::{
  evaluation::{Evaluator, SequentialEvaluator},
  hypervolume::NormalizedHypervolume,
  reference::{LatticeConfig, ReferenceLattice, ReferencePointSelection},
  solution::{Problem, Solution},
};
use rand::prelude::*;
use rand_distr::Normal;

/// DTLZ2 with 3 objectives and 12 decision variables. The Pareto front is
/// the positive octant of the unit sphere.
struct Dtlz2;

const OBJECTIVES: usize = 3;
const VARIABLES: usize = 12;

impl Problem<Vec<f64>> for Dtlz2 {
  fn objective_count(&self) -> usize {
    OBJECTIVES
  }

  fn evaluate(&self, solution: &mut Solution<Vec<f64>>) {
    let x = solution.decision();
    let g: f64 = x[OBJECTIVES - 1..].iter().map(|v| (v - 0.5).powi(2)).sum();
    let objectives: Vec<f64> = (0..OBJECTIVES)
      .map(|o| {
        let cosines: f64 = x[..OBJECTIVES - 1 - o]
          .iter()
          .map(|v| (v * FRAC_PI_2).cos())
          .product();
        let sine = if o == 0 {
          1.0
        } else {
          (x[OBJECTIVES - 1 - o] * FRAC_PI_2).sin()
        };
        (1.0 + g) * cosines * sine
      })
      .collect();
    solution.objectives_mut().copy_from_slice(&objectives);
  }
}

fn main() -> moea_core::Result<()> {
  env_logger::init();

  let config = LatticeConfig::builder()
    .objectives(OBJECTIVES)
    .divisions(12)
    .build();
  let lattice = ReferenceLattice::from_config(config)?;
  let population_size = lattice.len();
  info!("{population_size} reference points");
  // the lattice itself is an ideal front of DTLZ2 after normalization
  let indicator =
    NormalizedHypervolume::new(lattice.points())?.with_offset(0.1)?;

  let mut rng = StdRng::seed_from_u64(7);
  let mut selection =
    ReferencePointSelection::new(lattice, StdRng::seed_from_u64(11));
  let step = Normal::new(0.0, 0.05).expect("standard deviation is positive");

  let mut population: Vec<_> = (0..population_size)
    .map(|_| (0..VARIABLES).map(|_| rng.gen::<f64>()).collect::<Vec<_>>())
    .map(|x| Solution::unevaluated(x, OBJECTIVES))
    .collect();
  SequentialEvaluator.evaluate_all(&Dtlz2, &mut population);

  for generation in 0..100 {
    let mut offspring: Vec<_> = (0..population_size)
      .map(|_| {
        let parent_idx = rng.gen_range(0..population.len());
        let parent = population[parent_idx].decision();
        parent
          .iter()
          .map(|v| (v + step.sample(&mut rng)).clamp(0.0, 1.0))
          .collect::<Vec<_>>()
      })
      .map(|x| Solution::unevaluated(x, OBJECTIVES))
      .collect();
    SequentialEvaluator.evaluate_all(&Dtlz2, &mut offspring);

    population.extend(offspring);
    population = selection.select_from(population, population_size)?;

    if generation % 10 == 9 {
      info!(
        "generation {}: normalized hypervolume {:.4}",
        generation + 1,
        indicator.compute(&population)?
      );
    }
  }

  println!(
    "final normalized hypervolume: {:.4}",
    indicator.compute(&population)?
  );
  Ok(())
}

use log::info;
use moea_core::{
  archive::{Archive, CrowdingDistanceArchive, HypervolumeArchive},
  evaluation::{Evaluator, ParallelEvaluator, Parallelism},
  hypervolume::Hypervolume,
  solution::{Problem, Solution},
};
use rand::prelude::*;
use rand_distr::Normal;

fn main() -> moea_core::Result<()> {
  // RUST_LOG=debug shows archive evictions
  env_logger::init();

  // Schaffer's problem No. 1: f1(x) = x^2, f2(x) = (x - 2)^2
  let problem = (2, |x: &f64| vec![x.powi(2), (x - 2.0).powi(2)]);
  let evaluator =
    ParallelEvaluator::new(4)?.with_parallelism(Parallelism::Batch);

  let mut rng = StdRng::seed_from_u64(2024);
  let step = Normal::new(0.0, 0.5).expect("standard deviation is positive");

  let mut crowding = CrowdingDistanceArchive::with_capacity(20)?;
  let mut hypervolume = HypervolumeArchive::with_capacity(20)?;

  // initial solutions lie between -10 and 10
  let mut offspring: Vec<_> = (0..100)
    .map(|_| rng.gen_range(-10.0..10.0))
    .map(|x| Solution::unevaluated(x, problem.objective_count()))
    .collect();

  for generation in 0..50 {
    evaluator.evaluate_all(&problem, &mut offspring);
    for solution in offspring.drain(..) {
      crowding.add(solution.clone());
      hypervolume.add(solution);
    }
    info!(
      "generation {generation}: {} solutions in archive",
      crowding.size()
    );

    // perturb random archive members
    let parents = crowding.solutions();
    offspring = (0..100)
      .map(|_| {
        let parent = parents[rng.gen_range(0..parents.len())].decision();
        parent + step.sample(&mut rng)
      })
      .map(|x| Solution::unevaluated(x, problem.objective_count()))
      .collect();
  }

  let reference_point = [5.0, 5.0];
  for (name, front) in [
    ("crowding distance", crowding.solutions()),
    ("hypervolume contribution", hypervolume.solutions()),
  ] {
    let volume = Hypervolume.compute(front, &reference_point)?;
    println!("{name}: {} solutions, hypervolume {volume:.4}", front.len());
  }

  let mut decisions: Vec<f64> =
    crowding.solutions().iter().map(|s| *s.decision()).collect();
  decisions.sort_by(f64::total_cmp);
  print!("x=[");
  let mut iter = decisions.into_iter();
  if let Some(x) = iter.next() {
    print!("{x:.3}");
  }
  for x in iter {
    print!(",{x:.3}");
  }
  println!("]");

  Ok(())
}

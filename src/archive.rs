//! Archives of mutually non-dominated solutions.
//!
//! [`NonDominatedArchive`] keeps every non-dominated solution it is offered.
//! [`BoundedArchive`] additionally keeps at most `capacity` of them, pruning
//! the least valuable ones with a [`DiversityEstimator`].
//!
//! Both archives follow the same insertion rules:
//! - a candidate with a different number of objectives than the members is
//!   rejected;
//! - a candidate dominated by any member is rejected;
//! - a candidate with the same objective values and violation degree as a
//!   member is rejected, unless duplicates are allowed;
//! - otherwise every member dominated by the candidate is removed and the
//!   candidate is appended.
//!
//! Members keep their insertion order.

use std::cmp::Ordering;

use log::{debug, trace};
use typed_builder::TypedBuilder;

use crate::{
  dominance::{ConstrainedDominance, Dominance},
  error::{Error, Result},
  estimator::{
    CrowdingDistance, DiversityEstimator, ElectrostaticEnergy,
    HypervolumeContribution, IndicatorPotential,
  },
  solution::Evaluated,
};

/// A collection of mutually non-dominated solutions.
pub trait Archive<S> {
  /// Offers `solution` to the archive. Returns `true` if the membership of
  /// the archive changed.
  fn add(&mut self, solution: S) -> bool;

  /// Returns the members of the archive in insertion order.
  fn solutions(&self) -> &[S];

  /// Consumes the archive, returning its members.
  fn into_solutions(self) -> Vec<S>
  where
    Self: Sized;

  /// Returns the number of members.
  fn size(&self) -> usize {
    self.solutions().len()
  }

  /// Returns `true` if the archive has no members.
  fn is_empty(&self) -> bool {
    self.size() == 0
  }

  /// Offers `solution` to the archive like [`add`](Archive::add), but fails
  /// instead of silently rejecting a candidate whose number of objectives
  /// differs from the members'.
  ///
  /// # Errors
  ///
  /// Returns [`Error::DimensionMismatch`] if the archive is not empty and
  /// its members have a different number of objectives than `solution`.
  fn try_add(&mut self, solution: S) -> Result<bool>
  where
    S: Evaluated,
  {
    if let Some(member) = self.solutions().first() {
      Error::check_dimension(
        member.objectives().len(),
        solution.objectives().len(),
      )?;
    }
    Ok(self.add(solution))
  }

  /// Offers every member of `other` to this archive, in `other`'s order.
  fn join<A: Archive<S>>(&mut self, other: A) {
    for solution in other.into_solutions() {
      self.add(solution);
    }
  }
}

/// Configuration of a [`BoundedArchive`].
#[derive(TypedBuilder, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ArchiveConfig {
  /// Maximum number of members. Must be at least 1.
  #[builder(setter(doc = "Sets the maximum number of archive members."))]
  pub capacity: usize,
  /// Whether solutions with the same objective values and violation degree
  /// as a member are accepted.
  #[builder(
    default = false,
    setter(doc = "Accepts solutions equal to an existing member. Off by \
                  default.")
  )]
  pub allow_duplicates: bool,
}

fn is_duplicate<S: Evaluated>(a: &S, b: &S) -> bool {
  a.constraint_violation() == b.constraint_violation()
    && a.objectives() == b.objectives()
}

/// Applies the insertion rules. Returns the number of displaced members, or
/// `None` if the candidate was rejected. An accepted candidate is the last
/// member.
fn insert_nondominated<S: Evaluated, D: Dominance<S>>(
  members: &mut Vec<S>,
  candidate: S,
  dominance: &D,
  allow_duplicates: bool,
) -> Option<usize> {
  if let Some(first) = members.first() {
    let (expected, found) =
      (first.objectives().len(), candidate.objectives().len());
    if expected != found {
      trace!(
        "candidate rejected, {found} objectives where members have {expected}"
      );
      return None;
    }
  }

  let mut dominated = vec![false; members.len()];
  for (idx, member) in members.iter().enumerate() {
    match dominance.compare(&candidate, member) {
      Ordering::Greater => {
        trace!("candidate rejected, dominated by member {idx}");
        return None;
      }
      Ordering::Less => dominated[idx] = true,
      Ordering::Equal => {
        if !allow_duplicates && is_duplicate(&candidate, member) {
          trace!("candidate rejected, duplicate of member {idx}");
          return None;
        }
      }
    }
  }

  let displaced = dominated.iter().filter(|&&d| d).count();
  if displaced > 0 {
    let mut flags = dominated.into_iter();
    members.retain(|_| !flags.next().unwrap_or(false));
    trace!("candidate displaced {displaced} members");
  }
  members.push(candidate);
  Some(displaced)
}

/// An unbounded archive of non-dominated solutions.
///
/// # Examples
/// ```
/// # use moea_core::archive::{Archive, NonDominatedArchive};
/// let mut archive = NonDominatedArchive::new();
/// assert!(archive.add(vec![1.0, 3.0]));
/// assert!(archive.add(vec![3.0, 1.0]));
/// assert!(!archive.add(vec![4.0, 4.0]));
/// assert!(archive.add(vec![0.0, 0.0]));
/// assert_eq!(archive.solutions(), &[vec![0.0, 0.0]]);
/// ```
#[derive(Clone, Debug)]
pub struct NonDominatedArchive<S, D = ConstrainedDominance> {
  members: Vec<S>,
  dominance: D,
  allow_duplicates: bool,
}

impl<S> NonDominatedArchive<S> {
  /// Creates an empty archive using [`ConstrainedDominance`].
  pub fn new() -> Self {
    Self {
      members: Vec::new(),
      dominance: ConstrainedDominance,
      allow_duplicates: false,
    }
  }
}

impl<S> Default for NonDominatedArchive<S> {
  fn default() -> Self {
    Self::new()
  }
}

impl<S, D> NonDominatedArchive<S, D> {
  /// Replaces the dominance relation. Existing members are kept as is.
  pub fn with_dominance<D2>(self, dominance: D2) -> NonDominatedArchive<S, D2> {
    NonDominatedArchive {
      members: self.members,
      dominance,
      allow_duplicates: self.allow_duplicates,
    }
  }

  /// Sets whether solutions equal to a member are accepted.
  pub fn allow_duplicates(mut self, allow: bool) -> Self {
    self.allow_duplicates = allow;
    self
  }
}

impl<S, D> Archive<S> for NonDominatedArchive<S, D>
where
  S: Evaluated,
  D: Dominance<S>,
{
  fn add(&mut self, solution: S) -> bool {
    insert_nondominated(
      &mut self.members,
      solution,
      &self.dominance,
      self.allow_duplicates,
    )
    .is_some()
  }

  fn solutions(&self) -> &[S] {
    &self.members
  }

  fn into_solutions(self) -> Vec<S> {
    self.members
  }
}

/// An archive of at most `capacity` non-dominated solutions.
///
/// Whenever an insertion makes the archive overfull, the members the
/// estimator ranks least valuable are evicted. The candidate itself may be
/// evicted, in which case [`add`](Archive::add) reports no change.
#[derive(Clone, Debug)]
pub struct BoundedArchive<S, E, D = ConstrainedDominance> {
  members: Vec<S>,
  capacity: usize,
  estimator: E,
  dominance: D,
  allow_duplicates: bool,
}

/// An archive pruned by NSGA-II crowding distance.
pub type CrowdingDistanceArchive<S, D = ConstrainedDominance> =
  BoundedArchive<S, CrowdingDistance, D>;
/// An archive pruned by hypervolume contribution (SMS-EMOA).
pub type HypervolumeArchive<S, D = ConstrainedDominance> =
  BoundedArchive<S, HypervolumeContribution, D>;
/// An archive pruned by IBEA indicator potential.
pub type IndicatorArchive<S, D = ConstrainedDominance> =
  BoundedArchive<S, IndicatorPotential, D>;
/// An archive pruned by ESPEA electrostatic energy.
pub type EnergyArchive<S, D = ConstrainedDominance> =
  BoundedArchive<S, ElectrostaticEnergy, D>;

impl<S, E> BoundedArchive<S, E> {
  /// Creates an empty archive using [`ConstrainedDominance`].
  ///
  /// # Errors
  ///
  /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
  pub fn new(capacity: usize, estimator: E) -> Result<Self> {
    let config = ArchiveConfig::builder().capacity(capacity).build();
    Self::with_config(config, estimator)
  }

  /// Creates an empty archive from a validated configuration.
  ///
  /// # Errors
  ///
  /// Returns [`Error::ZeroCapacity`] if the configured capacity is zero.
  pub fn with_config(config: ArchiveConfig, estimator: E) -> Result<Self> {
    if config.capacity == 0 {
      return Err(Error::ZeroCapacity);
    }
    Ok(Self {
      members: Vec::with_capacity(config.capacity + 1),
      capacity: config.capacity,
      estimator,
      dominance: ConstrainedDominance,
      allow_duplicates: config.allow_duplicates,
    })
  }
}

impl<S, E: Default> BoundedArchive<S, E> {
  /// Creates an empty archive with the default estimator.
  ///
  /// # Errors
  ///
  /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
  pub fn with_capacity(capacity: usize) -> Result<Self> {
    Self::new(capacity, E::default())
  }
}

impl<S, E, D> BoundedArchive<S, E, D> {
  /// Replaces the dominance relation. Existing members are kept as is.
  pub fn with_dominance<D2>(self, dominance: D2) -> BoundedArchive<S, E, D2> {
    BoundedArchive {
      members: self.members,
      capacity: self.capacity,
      estimator: self.estimator,
      dominance,
      allow_duplicates: self.allow_duplicates,
    }
  }

  /// Returns the maximum number of members.
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Returns the estimator used for pruning.
  pub fn estimator(&self) -> &E {
    &self.estimator
  }
}

impl<S, E, D> Archive<S> for BoundedArchive<S, E, D>
where
  S: Evaluated,
  E: DiversityEstimator,
  D: Dominance<S>,
{
  fn add(&mut self, solution: S) -> bool {
    let Some(displaced) = insert_nondominated(
      &mut self.members,
      solution,
      &self.dominance,
      self.allow_duplicates,
    ) else {
      return false;
    };
    if self.members.len() <= self.capacity {
      return true;
    }

    let overflow = self.members.len() - self.capacity;
    let candidate_idx = self.members.len() - 1;
    let mut evicted = self.estimator.eviction_order(&self.members, overflow);
    debug!(
      "archive over capacity, evicting {} of {} members",
      evicted.len(),
      self.members.len()
    );
    let candidate_evicted = evicted.contains(&candidate_idx);

    evicted.sort_unstable_by(|a, b| b.cmp(a));
    for idx in evicted {
      self.members.remove(idx);
    }
    debug_assert!(
      self.members.len() <= self.capacity,
      "archive holds {} members, capacity is {}",
      self.members.len(),
      self.capacity
    );

    !(candidate_evicted && displaced == 0)
  }

  fn solutions(&self) -> &[S] {
    &self.members
  }

  fn into_solutions(self) -> Vec<S> {
    self.members
  }
}

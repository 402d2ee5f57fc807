//! Error type shared by every fallible operation of the crate.

use std::{io, num::ParseFloatError, path::PathBuf};

/// An alias for results returned by this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised on misuse of the crate or on malformed input data.
///
/// Degenerate numeric input (zero objective range, empty fronts) is never
/// reported as an error, it is absorbed by the component that meets it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// An archive was configured with a capacity of zero.
  #[error("archive capacity must be at least 1")]
  ZeroCapacity,

  /// A component was configured for zero objectives.
  #[error("at least one objective is required")]
  NoObjectives,

  /// A reference point lattice was configured with zero divisions.
  #[error("reference point lattice requires at least one division")]
  ZeroDivisions,

  /// An objective vector does not have the expected number of values.
  #[error("expected {expected} objective values, found {found}")]
  DimensionMismatch {
    /// Number of objectives the component was set up for.
    expected: usize,
    /// Number of objectives actually supplied.
    found: usize,
  },

  /// A numeric parameter is outside of its valid domain.
  #[error("invalid value for `{name}`: {reason}")]
  InvalidParameter {
    /// Name of the parameter.
    name: &'static str,
    /// Why the value was refused.
    reason: String,
  },

  /// A reference front without a single point was supplied.
  #[error("reference front is empty")]
  EmptyFront,

  /// A front file could not be read.
  #[error("failed to read front from `{}`", path.display())]
  Io {
    /// Path of the file.
    path: PathBuf,
    /// Underlying error.
    #[source]
    source: io::Error,
  },

  /// A value in a front table is not a number.
  #[error("line {line}: `{token}` is not a number")]
  Parse {
    /// One-based line number.
    line: usize,
    /// The offending token.
    token: String,
    /// Underlying error.
    #[source]
    source: ParseFloatError,
  },

  /// A line of a front table has a different number of values than the
  /// first line.
  #[error("line {line}: expected {expected} values, found {found}")]
  RaggedFront {
    /// One-based line number.
    line: usize,
    /// Number of values on the first line.
    expected: usize,
    /// Number of values on this line.
    found: usize,
  },

  /// The evaluation thread pool could not be built.
  #[error(transparent)]
  ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
  pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
    Self::InvalidParameter {
      name,
      reason: reason.into(),
    }
  }

  /// Returns `DimensionMismatch` unless `found == expected`.
  pub(crate) fn check_dimension(expected: usize, found: usize) -> Result<()> {
    if expected == found {
      Ok(())
    } else {
      Err(Self::DimensionMismatch { expected, found })
    }
  }
}

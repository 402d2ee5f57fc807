//! Reading reference fronts from delimited text tables.
//!
//! A front table has one solution per line and one objective value per
//! column. Blank lines are skipped, every other line must have the same
//! number of values.

use std::{
  fs::File,
  io::{BufRead, BufReader},
  path::Path,
};

use crate::{
  error::{Error, Result},
  score::Score,
};

/// Column separator of a front table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Delimiter {
  /// Values separated by `,`.
  #[default]
  Comma,
  /// Values separated by tabs.
  Tab,
}

impl Delimiter {
  fn as_char(self) -> char {
    match self {
      Self::Comma => ',',
      Self::Tab => '\t',
    }
  }
}

/// Reads a front table from the file at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read, and the
/// errors of [`parse_front`] for malformed content.
pub fn read_front(
  path: impl AsRef<Path>,
  delimiter: Delimiter,
) -> Result<Vec<Vec<Score>>> {
  let path = path.as_ref();
  let file = File::open(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;
  parse_front(BufReader::new(file), delimiter).map_err(|e| match e {
    Error::Io { source, .. } => Error::Io {
      path: path.to_path_buf(),
      source,
    },
    e => e,
  })
}

/// Parses a front table from `reader`.
///
/// # Errors
///
/// Returns [`Error::Parse`] for a value that is not a number and
/// [`Error::RaggedFront`] for a line whose number of values differs from the
/// first line. Line numbers are one-based.
///
/// # Examples
/// ```
/// # use moea_core::front::{parse_front, Delimiter};
/// let table = "1.0\t2.0\n\n3.0\t4.0\n";
/// let front = parse_front(table.as_bytes(), Delimiter::Tab).unwrap();
/// assert_eq!(front, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
/// ```
pub fn parse_front(
  reader: impl BufRead,
  delimiter: Delimiter,
) -> Result<Vec<Vec<Score>>> {
  let mut front: Vec<Vec<Score>> = Vec::new();
  for (idx, line) in reader.lines().enumerate() {
    let line_no = idx + 1;
    let line = line.map_err(|source| Error::Io {
      path: Default::default(),
      source,
    })?;
    let line = line.trim();
    if line.is_empty() {
      continue;
    }

    let point = line
      .split(delimiter.as_char())
      .map(|token| {
        let token = token.trim();
        token.parse::<Score>().map_err(|source| Error::Parse {
          line: line_no,
          token: token.to_owned(),
          source,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    if let Some(first) = front.first() {
      if first.len() != point.len() {
        return Err(Error::RaggedFront {
          line: line_no,
          expected: first.len(),
          found: point.len(),
        });
      }
    }
    front.push(point);
  }
  Ok(front)
}

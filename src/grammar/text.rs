//! Reader for the line-oriented grammar format:
//!
//! ```text
//! Non-terminals: E T X
//! Terminals: a +
//! Productions:
//! E -> T X
//! X -> + T X | e
//! T -> a
//! Start: E
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};

use super::{split_body, Body, Grammar};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
  #[error("line {line}: production is missing `->`")]
  MissingArrow {
    line: usize,
  },
  #[error("line {line}: production outside of the `Productions:` section")]
  StrayProduction {
    line: usize,
  },
  #[error("line {line}: empty alternative, write `e` for an empty body")]
  EmptyAlternative {
    line: usize,
  },
  #[error("no `Start:` line")]
  MissingStart,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
  Header,
  Productions,
}

impl Grammar {
  /// Parses the textual grammar format. Only the layout is checked here,
  /// see [`Grammar::validate`] for the grammar invariants.
  pub fn parse(text: &str) -> Result<Grammar, ReadError> {
    let mut non_terminals = IndexSet::new();
    let mut terminals = IndexSet::new();
    let mut productions = IndexMap::<String, Vec<Body>>::new();
    let mut start = None;
    let mut section = Section::Header;

    for (i, line) in text.lines().enumerate() {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }

      if let Some(rest) = line.strip_prefix("Non-terminals:") {
        section = Section::Header;
        non_terminals = words(rest);
      } else if let Some(rest) = line.strip_prefix("Terminals:") {
        section = Section::Header;
        terminals = words(rest);
      } else if line.starts_with("Productions:") {
        section = Section::Productions;
      } else if let Some(rest) = line.strip_prefix("Start:") {
        section = Section::Header;
        start = Some(rest.trim().to_owned());
      } else if section == Section::Productions {
        let (head, bodies) = line.split_once("->")
          .ok_or(ReadError::MissingArrow { line: i + 1 })?;
        let bodies = bodies.split('|')
          .map(split_body)
          .collect::<Vec<_>>();
        if bodies.iter().any(Vec::is_empty) {
          return Err(ReadError::EmptyAlternative { line: i + 1 });
        }
        productions.entry(head.trim().to_owned())
          .or_default()
          .extend(bodies);
      } else {
        return Err(ReadError::StrayProduction { line: i + 1 });
      }
    }

    let start = start.ok_or(ReadError::MissingStart)?;
    Ok(Grammar::new(non_terminals, terminals, productions, start))
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Grammar, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
      path: path.display().to_string(),
      source,
    })?;
    Ok(Grammar::parse(&text)?)
  }
}

impl FromStr for Grammar {
  type Err = ReadError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Grammar::parse(s)
  }
}

fn words(s: &str) -> IndexSet<String> {
  s.split_whitespace().map(str::to_owned).collect()
}

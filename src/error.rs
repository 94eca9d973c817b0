use std::io;
use thiserror::Error;

use crate::grammar::text::ReadError;
use crate::parser::driver::Rejection;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("grammar is not context-free: {0}")]
  GrammarInvalid(#[from] GrammarError),

  #[error("grammar is not LL(1): [{nonterm}, {lookahead}] is claimed by `{existing}` and `{conflicting}`")]
  TableConflict {
    nonterm: String,
    lookahead: String,
    existing: String,
    conflicting: String,
  },

  #[error("input rejected: {0}")]
  ParseRejected(Rejection),

  #[error("unknown token `{token}` at position {position}")]
  UnknownToken {
    token: String,
    position: usize,
  },

  #[error(transparent)]
  Read(#[from] ReadError),

  #[error("{path}: {source}")]
  Io {
    path: String,
    source: io::Error,
  },
}

/// The context-free invariant a [`Grammar`](crate::Grammar) violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
  #[error("start symbol `{0}` is not a declared non-terminal")]
  UndeclaredStart(String),

  #[error("production head `{0}` is not a declared non-terminal")]
  UndeclaredHead(String),

  #[error("production head `{0}` is a sequence of symbols")]
  MultiSymbolHead(String),

  #[error("symbol `{symbol}` in a production of `{head}` is not declared")]
  UndeclaredSymbol {
    head: String,
    symbol: String,
  },

  #[error("`{0}` is declared both as a terminal and as a non-terminal")]
  OverlappingSymbol(String),

  #[error("`{0}` is reserved and cannot be declared as a grammar symbol")]
  ReservedSymbol(String),
}

use std::fmt::{self, Display, Formatter};

use log::{debug, warn};

use super::sets::{FirstSets, FollowSets};
use crate::bnf::*;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  /// The terminal on top of the stack matches the input.
  Pop,
  /// End-marker on both the stack and the input.
  Accept,
  Expand(ProdId),
  Error,
}

/// What to do when two alternatives of a non-terminal claim the same cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
  /// Fail with [`Error::TableConflict`].
  #[default]
  Reject,
  /// Keep the alternative declared first.
  FirstWins,
  /// Keep the alternative declared last.
  LastWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
  pub nonterm: NontermId,
  /// A terminal or the end-marker.
  pub lookahead: Symbol,
  pub existing: ProdId,
  pub conflicting: ProdId,
}

/// LL(1) table. Only non-terminal rows are stored, terminal rows are
/// fixed by the alphabet.
#[derive(Debug, Clone)]
pub struct ParseTable {
  num_terms: usize,
  /// nonterm -> column (terminals, then end-marker)
  rows: Vec<Vec<Option<ProdId>>>,
  conflicts: Vec<Conflict>,
}

impl ParseTable {
  fn new(num_terms: usize, num_nonterms: usize) -> Self {
    Self {
      num_terms,
      rows: vec![vec![None; num_terms + 1]; num_nonterms],
      conflicts: vec![],
    }
  }

  fn column(&self, lookahead: Symbol) -> Option<usize> {
    match lookahead {
      Symbol::Term(id) => Some(id.0 as usize),
      Symbol::End => Some(self.num_terms),
      Symbol::Nonterm(_) | Symbol::Epsilon => None,
    }
  }

  pub fn get(&self, row: Symbol, col: Symbol) -> Action {
    match (row, col) {
      (Symbol::Term(a), Symbol::Term(b)) if a == b => Action::Pop,
      (Symbol::End, Symbol::End) => Action::Accept,
      (Symbol::Nonterm(nonterm), _) => self.expansion(nonterm, col)
        .map_or(Action::Error, Action::Expand),
      _ => Action::Error,
    }
  }

  /// The production to expand `nonterm` by on `lookahead`, if any.
  pub fn expansion(&self, nonterm: NontermId, lookahead: Symbol) -> Option<ProdId> {
    let col = self.column(lookahead)?;
    self.rows[nonterm.0 as usize][col]
  }

  /// Conflicts tolerated by a non-rejecting [`ConflictPolicy`].
  pub fn conflicts(&self) -> &[Conflict] {
    &self.conflicts
  }

  fn insert(
    &mut self,
    bnf: &Bnf,
    nonterm: NontermId,
    lookahead: Symbol,
    prod: ProdId,
    policy: ConflictPolicy,
  ) -> Result<(), Error> {
    let col = match self.column(lookahead) {
      Some(col) => col,
      None => return Ok(()),
    };
    let cell = &mut self.rows[nonterm.0 as usize][col];
    let existing = match *cell {
      None => {
        *cell = Some(prod);
        return Ok(());
      }
      Some(existing) if existing == prod => return Ok(()),
      Some(existing) => existing,
    };

    match policy {
      ConflictPolicy::Reject => {
        return Err(Error::TableConflict {
          nonterm: bnf.nonterm_name(nonterm).to_owned(),
          lookahead: bnf.name(lookahead).to_owned(),
          existing: bnf.display_prod(existing).to_string(),
          conflicting: bnf.display_prod(prod).to_string(),
        });
      }
      ConflictPolicy::FirstWins => {}
      ConflictPolicy::LastWins => *cell = Some(prod),
    }

    warn!(
      "conflict at [{}, {}]: `{}` vs `{}`, resolved by {:?}",
      bnf.nonterm_name(nonterm),
      bnf.name(lookahead),
      bnf.display_prod(existing),
      bnf.display_prod(prod),
      policy,
    );
    self.conflicts.push(Conflict {
      nonterm,
      lookahead,
      existing,
      conflicting: prod,
    });
    Ok(())
  }

  pub fn display<'a>(&'a self, bnf: &'a Bnf) -> DisplayTable<'a> {
    DisplayTable {
      bnf,
      table: self,
    }
  }
}

/// Builds the table from FIRST and FOLLOW sets computed for `bnf`.
pub fn build_table(
  bnf: &Bnf,
  first: &FirstSets,
  follow: &FollowSets,
  policy: ConflictPolicy,
) -> Result<ParseTable, Error> {
  let mut table = ParseTable::new(bnf.num_terms(), bnf.num_nonterms());

  for nonterm in bnf.nonterms() {
    for &prod_id in bnf.prods_of(nonterm) {
      let first_alpha = first.of_symbols(bnf.prod(prod_id).symbols());

      for term in first_alpha.terms() {
        table.insert(bnf, nonterm, Symbol::Term(term), prod_id, policy)?;
      }

      if first_alpha.contains_epsilon() {
        for sym in follow.get(nonterm).iter() {
          table.insert(bnf, nonterm, sym, prod_id, policy)?;
        }
        // epsilon default, whether or not `$` is in FOLLOW
        table.insert(bnf, nonterm, Symbol::End, prod_id, policy)?;
      }
    }
  }

  debug!(
    "built a {}x{} table with {} conflicts",
    bnf.num_nonterms() + bnf.num_terms() + 1,
    bnf.num_terms() + 1,
    table.conflicts.len(),
  );
  Ok(table)
}

/// Renders the full table, non-terminal rows first, then terminal rows and
/// the end-marker row.
pub struct DisplayTable<'a> {
  bnf: &'a Bnf,
  table: &'a ParseTable,
}

impl Display for DisplayTable<'_> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let bnf = self.bnf;
    let cols = bnf.terms()
      .map(Symbol::Term)
      .chain(Some(Symbol::End))
      .collect::<Vec<_>>();
    let rows = bnf.nonterms()
      .map(Symbol::Nonterm)
      .chain(cols.iter().copied())
      .collect::<Vec<_>>();

    let cell = |row: Symbol, col: Symbol| -> String {
      match self.table.get(row, col) {
        Action::Pop => "pop".to_owned(),
        Action::Accept => "acc".to_owned(),
        Action::Expand(prod) => bnf.display_prod(prod).to_string(),
        Action::Error => "err".to_owned(),
      }
    };

    let mut grid = vec![
      Some(String::new()).into_iter()
        .chain(cols.iter().map(|&col| bnf.name(col).to_owned()))
        .collect::<Vec<_>>(),
    ];
    for &row in &rows {
      grid.push(Some(bnf.name(row).to_owned()).into_iter()
        .chain(cols.iter().map(|&col| cell(row, col)))
        .collect());
    }

    let mut widths = vec![0; cols.len() + 1];
    for line in &grid {
      for (width, text) in widths.iter_mut().zip(line) {
        *width = (*width).max(text.chars().count());
      }
    }

    for line in &grid {
      let mut out = String::new();
      for (i, (text, &width)) in line.iter().zip(&widths).enumerate() {
        if i > 0 {
          out.push_str("  ");
        }
        out.push_str(&format!("{:<width$}", text, width = width));
      }
      writeln!(f, "{}", out.trim_end())?;
    }
    Ok(())
  }
}

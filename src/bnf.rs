use std::fmt::{self, Display, Formatter};

use indexmap::IndexSet;

use crate::error::GrammarError;
use crate::grammar::{Grammar, END_MARKER, EPSILON};

/// A validated grammar with every symbol resolved to a [`Symbol`].
#[derive(Debug, Clone)]
pub struct Bnf {
  pub(crate) terms: IndexSet<String>,
  pub(crate) nonterms: IndexSet<String>,
  /// alternatives of each non-terminal, in declaration order
  pub(crate) alternatives: Vec<Vec<ProdId>>,
  pub(crate) prods: Vec<Production>,
  pub(crate) start: NontermId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
  Term(TermId),
  Nonterm(NontermId),
  End,
  Epsilon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NontermId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProdId(pub(crate) u32);

#[derive(Debug, Clone)]
pub struct Production {
  pub(crate) nonterm_id: NontermId,
  /// empty for an epsilon production
  pub(crate) symbols: Vec<Symbol>,
}

impl Production {
  pub fn head(&self) -> NontermId {
    self.nonterm_id
  }

  pub fn symbols(&self) -> &[Symbol] {
    &self.symbols
  }

  pub fn is_epsilon(&self) -> bool {
    self.symbols.is_empty()
  }
}

impl TryFrom<&Grammar> for Bnf {
  type Error = GrammarError;

  fn try_from(grammar: &Grammar) -> Result<Bnf, GrammarError> {
    grammar.validate()?;

    let terms = grammar.terminals().clone();
    let nonterms = grammar.non_terminals().clone();
    let mut alternatives = vec![vec![]; nonterms.len()];

    let resolve = |name: &str| -> Option<Symbol> {
      if name == EPSILON {
        None
      } else if let Some(ix) = terms.get_index_of(name) {
        Some(Symbol::Term(TermId(ix as u32)))
      } else {
        nonterms.get_index_of(name)
          .map(|ix| Symbol::Nonterm(NontermId(ix as u32)))
      }
    };

    let mut prods = vec![];
    for (head, bodies) in grammar.productions() {
      let nonterm_id = match resolve(head) {
        Some(Symbol::Nonterm(id)) => id,
        _ => return Err(GrammarError::UndeclaredHead(head.clone())),
      };
      for body in bodies {
        let prod_id = ProdId(prods.len() as u32);
        prods.push(Production {
          nonterm_id,
          symbols: body.iter().filter_map(|s| resolve(s)).collect(),
        });
        alternatives[nonterm_id.0 as usize].push(prod_id);
      }
    }

    let start = nonterms.get_index_of(grammar.start())
      .map(|ix| NontermId(ix as u32))
      .ok_or_else(|| GrammarError::UndeclaredStart(grammar.start().to_owned()))?;

    Ok(Bnf {
      terms,
      nonterms,
      alternatives,
      prods,
      start,
    })
  }
}

impl Bnf {
  pub fn num_terms(&self) -> usize {
    self.terms.len()
  }

  pub fn num_nonterms(&self) -> usize {
    self.nonterms.len()
  }

  pub fn start(&self) -> NontermId {
    self.start
  }

  pub fn terms(&self) -> impl Iterator<Item = TermId> + '_ {
    (0..self.terms.len()).map(|ix| TermId(ix as u32))
  }

  pub fn nonterms(&self) -> impl Iterator<Item = NontermId> + '_ {
    (0..self.nonterms.len()).map(|ix| NontermId(ix as u32))
  }

  pub fn prods(&self) -> impl Iterator<Item = (ProdId, &Production)> {
    self.prods.iter()
      .enumerate()
      .map(|(ix, prod)| (ProdId(ix as u32), prod))
  }

  pub fn prod(&self, id: ProdId) -> &Production {
    &self.prods[id.0 as usize]
  }

  /// Alternatives of `nonterm`, in declaration order.
  pub fn prods_of(&self, nonterm: NontermId) -> &[ProdId] {
    &self.alternatives[nonterm.0 as usize]
  }

  pub fn term_name(&self, id: TermId) -> &str {
    &self.terms[id.0 as usize]
  }

  pub fn nonterm_name(&self, id: NontermId) -> &str {
    &self.nonterms[id.0 as usize]
  }

  pub fn name(&self, symbol: Symbol) -> &str {
    match symbol {
      Symbol::Term(id) => self.term_name(id),
      Symbol::Nonterm(id) => self.nonterm_name(id),
      Symbol::End => END_MARKER,
      Symbol::Epsilon => EPSILON,
    }
  }

  pub fn term(&self, name: &str) -> Option<TermId> {
    self.terms.get_index_of(name).map(|ix| TermId(ix as u32))
  }

  pub fn nonterm(&self, name: &str) -> Option<NontermId> {
    self.nonterms.get_index_of(name).map(|ix| NontermId(ix as u32))
  }

  /// Resolves a symbol name the way tokens are read: `$` is the end-marker,
  /// `e` is epsilon.
  pub fn symbol(&self, name: &str) -> Option<Symbol> {
    match name {
      END_MARKER => Some(Symbol::End),
      EPSILON => Some(Symbol::Epsilon),
      _ => self.term(name).map(Symbol::Term)
        .or_else(|| self.nonterm(name).map(Symbol::Nonterm)),
    }
  }

  pub fn display_prod(&self, id: ProdId) -> DisplayProd<'_> {
    DisplayProd {
      bnf: self,
      prod: self.prod(id),
    }
  }
}

/// Renders a production as `A -> x y`, or `A -> e` when it is empty.
pub struct DisplayProd<'a> {
  bnf: &'a Bnf,
  prod: &'a Production,
}

impl Display for DisplayProd<'_> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} ->", self.bnf.nonterm_name(self.prod.nonterm_id))?;
    if self.prod.is_epsilon() {
      return write!(f, " {}", EPSILON);
    }
    for &sym in &self.prod.symbols {
      write!(f, " {}", self.bnf.name(sym))?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::{grammar, tests::expr};
  use pretty_assertions::assert_eq;

  #[test]
  fn resolves_symbols_by_declaration() {
    let bnf = Bnf::try_from(&expr()).unwrap();

    assert_eq!(bnf.num_terms(), 5);
    assert_eq!(bnf.num_nonterms(), 6);
    assert_eq!(bnf.start(), NontermId(0));
    assert_eq!(bnf.symbol("("), Some(Symbol::Term(TermId(3))));
    assert_eq!(bnf.symbol("Y"), Some(Symbol::Nonterm(NontermId(4))));
    assert_eq!(bnf.symbol("$"), Some(Symbol::End));
    assert_eq!(bnf.symbol("b"), None);
  }

  #[test]
  fn epsilon_body_is_empty() {
    let bnf = Bnf::try_from(&expr()).unwrap();
    let x = bnf.nonterm("X").unwrap();
    let prods = bnf.prods_of(x);

    assert_eq!(prods.len(), 2);
    assert!(!bnf.prod(prods[0]).is_epsilon());
    assert!(bnf.prod(prods[1]).is_epsilon());
    assert_eq!(bnf.display_prod(prods[0]).to_string(), "X -> + T X");
    assert_eq!(bnf.display_prod(prods[1]).to_string(), "X -> e");
  }

  #[test]
  fn lowercase_nonterminal() {
    let g = grammar(&["s"], &["A"], &[("s", "A s | e")], "s");
    let bnf = Bnf::try_from(&g).unwrap();
    let prod = bnf.prod(bnf.prods_of(NontermId(0))[0]);
    assert_eq!(prod.symbols(), &[
      Symbol::Term(TermId(0)),
      Symbol::Nonterm(NontermId(0)),
    ]);
  }

  #[test]
  fn names_round_trip_through_ids() {
    let bnf = Bnf::try_from(&expr()).unwrap();
    for nonterm in bnf.nonterms() {
      assert_eq!(bnf.nonterm(bnf.nonterm_name(nonterm)), Some(nonterm));
    }
    for term in bnf.terms() {
      assert_eq!(bnf.term(bnf.term_name(term)), Some(term));
    }
    assert_eq!(bnf.nonterm("a"), None);
    assert_eq!(bnf.term("E"), None);
  }

  #[test]
  fn rejects_invalid_grammar() {
    let g = grammar(&["A"], &["a"], &[("A", "a")], "S");
    assert_eq!(
      Bnf::try_from(&g).unwrap_err(),
      GrammarError::UndeclaredStart("S".into()),
    );
  }
}

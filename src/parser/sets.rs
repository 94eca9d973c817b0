use std::fmt::{self, Display, Formatter};

use log::debug;

use super::term_set::TermSet;
use crate::bnf::*;

/// FIRST set of every non-terminal, indexed by [`NontermId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets {
  sets: Vec<TermSet>,
  num_terms: usize,
}

/// FOLLOW set of every non-terminal, indexed by [`NontermId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets {
  sets: Vec<TermSet>,
}

impl FirstSets {
  pub fn get(&self, nonterm: NontermId) -> &TermSet {
    &self.sets[nonterm.0 as usize]
  }

  /// FIRST of a symbol sequence. An empty sequence is epsilon.
  pub fn of_symbols(&self, symbols: &[Symbol]) -> TermSet {
    let mut result = TermSet::new(self.num_terms);
    compute_first_for_symbols(&mut result, &self.sets, symbols);
    result
  }

  pub fn iter(&self) -> impl Iterator<Item = (NontermId, &TermSet)> {
    iter_sets(&self.sets)
  }

  pub fn display<'a>(&'a self, bnf: &'a Bnf) -> DisplaySets<'a> {
    DisplaySets {
      bnf,
      name: "FIRST",
      sets: &self.sets,
    }
  }
}

impl FollowSets {
  pub fn get(&self, nonterm: NontermId) -> &TermSet {
    &self.sets[nonterm.0 as usize]
  }

  pub fn iter(&self) -> impl Iterator<Item = (NontermId, &TermSet)> {
    iter_sets(&self.sets)
  }

  pub fn display<'a>(&'a self, bnf: &'a Bnf) -> DisplaySets<'a> {
    DisplaySets {
      bnf,
      name: "FOLLOW",
      sets: &self.sets,
    }
  }
}

fn iter_sets(sets: &[TermSet]) -> impl Iterator<Item = (NontermId, &TermSet)> {
  sets.iter()
    .enumerate()
    .map(|(ix, set)| (NontermId(ix as u32), set))
}

pub(crate) fn gen_first(
  bnf: &Bnf,
) -> FirstSets {
  let mut buf = TermSet::new(bnf.num_terms());
  let mut first = vec![buf.clone(); bnf.num_nonterms()];

  let mut passes = 0;
  loop {
    passes += 1;
    let mut changed = false;
    for prod in &bnf.prods {
      buf.clear();
      compute_first_for_symbols(&mut buf, &first, &prod.symbols);
      changed |= first[prod.nonterm_id.0 as usize].union_with(&buf);
    }
    if !changed {
      break;
    }
  }
  debug!("FIRST sets reached a fixed point after {} passes", passes);

  FirstSets {
    sets: first,
    num_terms: bnf.num_terms(),
  }
}

pub(crate) fn gen_follow(
  bnf: &Bnf,
  first: &FirstSets,
) -> FollowSets {
  let mut buf = TermSet::new(bnf.num_terms());
  let mut follow = vec![buf.clone(); bnf.num_nonterms()];
  follow[bnf.start.0 as usize].insert_end();

  let mut passes = 0;
  loop {
    passes += 1;
    let mut changed = false;
    for prod in &bnf.prods {
      let head = prod.nonterm_id.0 as usize;
      for (i, sym) in prod.symbols.iter().enumerate() {
        let nt = match sym {
          Symbol::Nonterm(id) => id.0 as usize,
          _ => continue,
        };

        let rest = &prod.symbols[i + 1..];
        buf.clear();
        let rest_nullable = match rest {
          [] => true,
          &[Symbol::Term(term)] => {
            buf.insert_term(term);
            false
          }
          _ => {
            compute_first_for_symbols(&mut buf, &first.sets, rest);
            buf.contains_epsilon()
          }
        };
        changed |= follow[nt].union_without_epsilon(&buf);

        if rest_nullable && nt != head {
          let head_follow = follow[head].clone();
          changed |= follow[nt].union_with(&head_follow);
        }
      }
    }
    if !changed {
      break;
    }
  }
  debug!("FOLLOW sets reached a fixed point after {} passes", passes);

  FollowSets {
    sets: follow,
  }
}

/// Adds FIRST of `symbols` to `result`, epsilon included when every symbol
/// can derive the empty string.
pub(super) fn compute_first_for_symbols(
  result: &mut TermSet,
  first: &[TermSet],
  symbols: &[Symbol],
) {
  for &sym in symbols {
    match sym {
      Symbol::Term(id) => {
        result.insert_term(id);
        return;
      }
      Symbol::End => {
        result.insert_end();
        return;
      }
      Symbol::Nonterm(id) => {
        let set = &first[id.0 as usize];
        result.union_without_epsilon(set);
        if !set.contains_epsilon() {
          return;
        }
      }
      Symbol::Epsilon => {}
    }
  }

  result.insert_epsilon();
}

/// Renders one set per line, `FIRST(E) = { a, ( }`.
pub struct DisplaySets<'a> {
  bnf: &'a Bnf,
  name: &'static str,
  sets: &'a [TermSet],
}

impl Display for DisplaySets<'_> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    for (nonterm, set) in iter_sets(self.sets) {
      write!(f, "{}({}) = {{", self.name, self.bnf.nonterm_name(nonterm))?;
      for (i, sym) in set.iter().enumerate() {
        let sep = if i == 0 { " " } else { ", " };
        write!(f, "{}{}", sep, self.bnf.name(sym))?;
      }
      writeln!(f, " }}")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::{grammar, tests::expr};
  use pretty_assertions::assert_eq;

  fn names(bnf: &Bnf, set: &TermSet) -> Vec<String> {
    set.iter().map(|sym| bnf.name(sym).to_owned()).collect()
  }

  fn expr_bnf() -> Bnf {
    Bnf::try_from(&expr()).unwrap()
  }

  #[test]
  fn expr_first() {
    let bnf = expr_bnf();
    let first = gen_first(&bnf);
    let of = |name| names(&bnf, first.get(bnf.nonterm(name).unwrap()));

    assert_eq!(of("F"), vec!["a", "("]);
    assert_eq!(of("E"), vec!["a", "("]);
    assert_eq!(of("X"), vec!["+", "e"]);
    assert_eq!(of("Y"), vec!["*", "e"]);
    assert_eq!(of("Z"), Vec::<String>::new());
  }

  #[test]
  fn expr_follow() {
    let bnf = expr_bnf();
    let first = gen_first(&bnf);
    let follow = gen_follow(&bnf, &first);
    let of = |name| names(&bnf, follow.get(bnf.nonterm(name).unwrap()));

    assert_eq!(of("X"), vec![")", "$"]);
    assert_eq!(of("E"), vec![")", "$"]);
    assert_eq!(of("T"), vec!["+", ")", "$"]);
    assert_eq!(of("F"), vec!["+", "*", ")", "$"]);
  }

  #[test]
  fn rendered_sets() {
    let bnf = expr_bnf();
    let first = gen_first(&bnf);
    let follow = gen_follow(&bnf, &first);

    insta::assert_snapshot!(first.display(&bnf).to_string(), @r###"
    FIRST(E) = { a, ( }
    FIRST(T) = { a, ( }
    FIRST(F) = { a, ( }
    FIRST(X) = { +, e }
    FIRST(Y) = { *, e }
    FIRST(Z) = { }
    "###);
    insta::assert_snapshot!(follow.display(&bnf).to_string(), @r###"
    FOLLOW(E) = { ), $ }
    FOLLOW(T) = { +, ), $ }
    FOLLOW(F) = { +, *, ), $ }
    FOLLOW(X) = { ), $ }
    FOLLOW(Y) = { +, ), $ }
    FOLLOW(Z) = { }
    "###);
  }

  #[test]
  fn epsilon_body_puts_epsilon_in_first() {
    let g = grammar(&["S", "A"], &["a"], &[("S", "A a"), ("A", "e")], "S");
    let bnf = Bnf::try_from(&g).unwrap();
    let first = gen_first(&bnf);

    assert!(first.get(bnf.nonterm("A").unwrap()).contains_epsilon());
    assert_eq!(names(&bnf, first.get(bnf.start())), vec!["a"]);
  }

  #[test]
  fn first_of_sequences() {
    let bnf = expr_bnf();
    let first = gen_first(&bnf);
    let sym = |name| bnf.symbol(name).unwrap();

    assert_eq!(names(&bnf, &first.of_symbols(&[])), vec!["e"]);
    assert_eq!(names(&bnf, &first.of_symbols(&[sym("X"), sym("Y")])), vec!["+", "*", "e"]);
    assert_eq!(names(&bnf, &first.of_symbols(&[sym("X"), sym(")")])), vec!["+", ")"]);
    assert_eq!(names(&bnf, &first.of_symbols(&[sym("*"), sym("X")])), vec!["*"]);
  }

  #[test]
  fn follow_is_idempotent() {
    let bnf = expr_bnf();
    let first = gen_first(&bnf);
    assert_eq!(gen_follow(&bnf, &first), gen_follow(&bnf, &first));
  }

  #[test]
  fn follow_through_nullable_tail() {
    // S -> A B c, B -> b | e: FOLLOW(A) picks up FIRST(B) and c.
    let g = grammar(
      &["S", "A", "B"],
      &["a", "b", "c"],
      &[("S", "A B c"), ("A", "a"), ("B", "b | e")],
      "S",
    );
    let bnf = Bnf::try_from(&g).unwrap();
    let first = gen_first(&bnf);
    let follow = gen_follow(&bnf, &first);

    assert_eq!(names(&bnf, follow.get(bnf.nonterm("A").unwrap())), vec!["b", "c"]);
    assert_eq!(names(&bnf, follow.get(bnf.nonterm("B").unwrap())), vec!["c"]);
    assert_eq!(names(&bnf, follow.get(bnf.start())), vec!["$"]);
  }
}

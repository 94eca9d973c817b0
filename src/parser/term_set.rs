use std::fmt::{self, Debug, Formatter};

use super::bitset::BitSet;
use crate::bnf::{Symbol, TermId};

/// A set of terminals that may also hold the end-marker and epsilon.
///
/// Terminal `i` is bit `i`; the end-marker and epsilon take the two bits
/// past the last terminal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TermSet {
  bits: BitSet,
  num_terms: usize,
}

impl TermSet {
  pub fn new(num_terms: usize) -> Self {
    Self {
      bits: BitSet::new(num_terms + 2),
      num_terms,
    }
  }

  fn end_bit(&self) -> usize {
    self.num_terms
  }

  fn epsilon_bit(&self) -> usize {
    self.num_terms + 1
  }

  pub fn clear(&mut self) {
    self.bits.clear();
  }

  /// Returns whether the set has changed.
  pub fn insert_term(&mut self, term: TermId) -> bool {
    self.bits.insert(term.0 as usize)
  }

  pub fn insert_end(&mut self) -> bool {
    let bit = self.end_bit();
    self.bits.insert(bit)
  }

  pub fn insert_epsilon(&mut self) -> bool {
    let bit = self.epsilon_bit();
    self.bits.insert(bit)
  }

  pub fn remove_epsilon(&mut self) {
    let bit = self.epsilon_bit();
    self.bits.remove(bit);
  }

  pub fn contains_term(&self, term: TermId) -> bool {
    self.bits.contains(term.0 as usize)
  }

  pub fn contains_end(&self) -> bool {
    self.bits.contains(self.end_bit())
  }

  pub fn contains_epsilon(&self) -> bool {
    self.bits.contains(self.epsilon_bit())
  }

  pub fn contains(&self, symbol: Symbol) -> bool {
    match symbol {
      Symbol::Term(term) => self.contains_term(term),
      Symbol::End => self.contains_end(),
      Symbol::Epsilon => self.contains_epsilon(),
      Symbol::Nonterm(_) => false,
    }
  }

  /// Returns whether the set has changed.
  pub fn union_with(&mut self, other: &TermSet) -> bool {
    self.bits.union_with(&other.bits)
  }

  /// Adds everything in `other` except epsilon. Returns whether the set has
  /// changed.
  pub fn union_without_epsilon(&mut self, other: &TermSet) -> bool {
    if other.contains_epsilon() {
      let mut other = other.clone();
      other.remove_epsilon();
      self.bits.union_with(&other.bits)
    } else {
      self.bits.union_with(&other.bits)
    }
  }

  pub fn len(&self) -> usize {
    self.bits.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bits.is_empty()
  }

  /// Terminals first in declaration order, then the end-marker, then
  /// epsilon.
  pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
    let num_terms = self.num_terms;
    self.bits.iter().map(move |bit| {
      if bit < num_terms {
        Symbol::Term(TermId(bit as u32))
      } else if bit == num_terms {
        Symbol::End
      } else {
        Symbol::Epsilon
      }
    })
  }

  pub fn terms(&self) -> impl Iterator<Item = TermId> + '_ {
    self.iter().filter_map(|sym| match sym {
      Symbol::Term(term) => Some(term),
      _ => None,
    })
  }
}

impl Debug for TermSet {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.debug_set().entries(self.iter()).finish()
  }
}

use std::fmt::{self, Display, Formatter};

use indexmap::{IndexMap, IndexSet};

use crate::error::GrammarError;

pub mod text;

/// Name of the empty-production marker.
pub const EPSILON: &str = "e";

/// Name of the end-of-input marker.
pub const END_MARKER: &str = "$";

/// One alternative of a production, as symbol names.
pub type Body = Vec<String>;

/// A grammar as declared, before any symbol is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
  non_terminals: IndexSet<String>,
  terminals: IndexSet<String>,
  productions: IndexMap<String, Vec<Body>>,
  start: String,
}

impl Grammar {
  pub fn new(
    non_terminals: IndexSet<String>,
    terminals: IndexSet<String>,
    productions: IndexMap<String, Vec<Body>>,
    start: impl Into<String>,
  ) -> Self {
    Self {
      non_terminals,
      terminals,
      productions,
      start: start.into(),
    }
  }

  pub fn non_terminals(&self) -> &IndexSet<String> {
    &self.non_terminals
  }

  pub fn terminals(&self) -> &IndexSet<String> {
    &self.terminals
  }

  pub fn productions(&self) -> &IndexMap<String, Vec<Body>> {
    &self.productions
  }

  pub fn start(&self) -> &str {
    &self.start
  }

  /// Alternatives of `non_terminal`, in declaration order. Empty if it has
  /// none.
  pub fn productions_for(&self, non_terminal: &str) -> &[Body] {
    self.productions.get(non_terminal).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn display_productions_for<'a>(
    &'a self,
    non_terminal: &'a str,
  ) -> DisplayProductionsFor<'a> {
    DisplayProductionsFor {
      grammar: self,
      non_terminal,
    }
  }

  pub fn is_context_free(&self) -> bool {
    self.validate().is_ok()
  }

  /// Checks the invariants the parser relies on and reports the first one
  /// that fails.
  pub fn validate(&self) -> Result<(), GrammarError> {
    if !self.non_terminals.contains(&self.start) {
      return Err(GrammarError::UndeclaredStart(self.start.clone()));
    }

    for name in self.non_terminals.iter().chain(&self.terminals) {
      if name == EPSILON || name == END_MARKER {
        return Err(GrammarError::ReservedSymbol(name.clone()));
      }
    }

    if let Some(name) = self.terminals.iter()
      .find(|&name| self.non_terminals.contains(name))
    {
      return Err(GrammarError::OverlappingSymbol(name.clone()));
    }

    for (head, bodies) in &self.productions {
      if head.split_whitespace().count() > 1 {
        return Err(GrammarError::MultiSymbolHead(head.clone()));
      }
      if !self.non_terminals.contains(head) {
        return Err(GrammarError::UndeclaredHead(head.clone()));
      }

      for symbol in bodies.iter().flatten() {
        if symbol != EPSILON
          && !self.terminals.contains(symbol)
          && !self.non_terminals.contains(symbol)
        {
          return Err(GrammarError::UndeclaredSymbol {
            head: head.clone(),
            symbol: symbol.clone(),
          });
        }
      }
    }

    Ok(())
  }
}

/// Renders the grammar in the format [`Grammar::parse`] reads, sections and
/// symbols in declaration order.
impl Display for Grammar {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let join = |names: &IndexSet<String>| {
      names.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
    };

    writeln!(f, "Non-terminals: {}", join(&self.non_terminals))?;
    writeln!(f, "Terminals: {}", join(&self.terminals))?;
    writeln!(f, "Productions:")?;
    for (head, bodies) in &self.productions {
      writeln!(f, "  {} -> {}", head, join_bodies(bodies))?;
    }
    writeln!(f, "Start: {}", self.start)
  }
}

/// One line: the alternatives of a non-terminal, or a note that it has none.
pub struct DisplayProductionsFor<'a> {
  grammar: &'a Grammar,
  non_terminal: &'a str,
}

impl Display for DisplayProductionsFor<'_> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let bodies = self.grammar.productions_for(self.non_terminal);
    if bodies.is_empty() {
      write!(f, "No productions found for {}", self.non_terminal)
    } else {
      write!(f, "Productions for {}: {}", self.non_terminal, join_bodies(bodies))
    }
  }
}

fn join_bodies(bodies: &[Body]) -> String {
  bodies.iter()
    .map(|body| body.join(" "))
    .collect::<Vec<_>>()
    .join(" | ")
}

/// Builds a [`Grammar`] from string slices. Alternatives are separated by
/// `|`, symbols by whitespace; `"e"` is the empty body.
pub fn grammar(
  non_terminals: &[&str],
  terminals: &[&str],
  productions: &[(&str, &str)],
  start: &str,
) -> Grammar {
  let mut rules = IndexMap::<String, Vec<Body>>::new();
  for &(head, bodies) in productions {
    let bodies = bodies.split('|').map(split_body);
    rules.entry(head.trim().to_owned())
      .or_default()
      .extend(bodies.inspect(|body| {
        debug_assert!(!body.is_empty(), "empty alternative of `{}`, use `e`", head);
      }));
  }

  Grammar::new(
    non_terminals.iter().map(|&s| s.to_owned()).collect(),
    terminals.iter().map(|&s| s.to_owned()).collect(),
    rules,
    start,
  )
}

pub(crate) fn split_body(body: &str) -> Body {
  body.split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  pub(crate) fn expr() -> Grammar {
    grammar(
      &["E", "T", "F", "X", "Y", "Z"],
      &["a", "+", "*", "(", ")"],
      &[
        ("E", "T X"),
        ("X", "+ T X | e"),
        ("T", "F Y"),
        ("Y", "* F Y | e"),
        ("F", "( E ) | a"),
      ],
      "E",
    )
  }

  #[test]
  fn expr_is_context_free() {
    assert!(expr().is_context_free());
  }

  #[test]
  fn productions_for() {
    let g = expr();
    assert_eq!(g.productions_for("X"), &[
      vec!["+".to_owned(), "T".to_owned(), "X".to_owned()],
      vec!["e".to_owned()],
    ]);
    assert!(g.productions_for("Z").is_empty());
    assert!(g.productions_for("nope").is_empty());
  }

  #[test]
  fn undeclared_start() {
    let g = grammar(&["A"], &["a"], &[("A", "a")], "S");
    assert!(!g.is_context_free());
    assert_eq!(g.validate(), Err(GrammarError::UndeclaredStart("S".into())));
  }

  #[test]
  fn undeclared_head() {
    let g = grammar(&["A"], &["a"], &[("A", "a"), ("B", "a")], "A");
    assert_eq!(g.validate(), Err(GrammarError::UndeclaredHead("B".into())));
  }

  #[test]
  fn multi_symbol_head() {
    let g = grammar(&["A", "B"], &["a"], &[("A B", "a")], "A");
    assert_eq!(g.validate(), Err(GrammarError::MultiSymbolHead("A B".into())));
  }

  #[test]
  fn undeclared_body_symbol() {
    let g = grammar(&["A"], &["a"], &[("A", "a b | e")], "A");
    assert_eq!(g.validate(), Err(GrammarError::UndeclaredSymbol {
      head: "A".into(),
      symbol: "b".into(),
    }));
  }

  #[test]
  fn overlapping_and_reserved() {
    let g = grammar(&["A", "a"], &["a"], &[("A", "a")], "A");
    assert_eq!(g.validate(), Err(GrammarError::OverlappingSymbol("a".into())));

    let g = grammar(&["A"], &["a", "$"], &[("A", "a")], "A");
    assert_eq!(g.validate(), Err(GrammarError::ReservedSymbol("$".into())));
  }

  #[test]
  fn renders_in_declaration_order() {
    insta::assert_snapshot!(expr().to_string(), @r###"
    Non-terminals: E T F X Y Z
    Terminals: a + * ( )
    Productions:
      E -> T X
      X -> + T X | e
      T -> F Y
      Y -> * F Y | e
      F -> ( E ) | a
    Start: E
    "###);
  }

  #[test]
  fn rendering_reads_back() {
    let g = expr();
    assert_eq!(Grammar::parse(&g.to_string()).unwrap(), g);
  }

  #[test]
  fn renders_productions_for() {
    let g = expr();
    assert_eq!(
      g.display_productions_for("F").to_string(),
      "Productions for F: ( E ) | a",
    );
    assert_eq!(
      g.display_productions_for("Z").to_string(),
      "No productions found for Z",
    );
  }

  #[test]
  fn multi_character_symbols() {
    let g = grammar(
      &["Expr", "expr"],
      &["id", "PLUS"],
      &[("Expr", "id expr"), ("expr", "PLUS id expr | e")],
      "Expr",
    );
    assert!(g.is_context_free());
  }
}

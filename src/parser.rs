use log::debug;

use crate::bnf::{Bnf, Symbol};
use crate::config::Config;
use crate::error::Error;
use crate::grammar::{Grammar, END_MARKER};

mod bitset;
pub mod driver;
pub mod sets;
pub mod table;
pub mod term_set;

use driver::Parse;
use sets::{FirstSets, FollowSets};
use table::ParseTable;

/// An LL(1) parser for one grammar. FIRST, FOLLOW and the table are
/// computed once, in [`Parser::new`].
#[derive(Debug, Clone)]
pub struct Parser {
  bnf: Bnf,
  first: FirstSets,
  follow: FollowSets,
  table: ParseTable,
}

impl Parser {
  pub fn new(grammar: &Grammar, config: &Config) -> Result<Self, Error> {
    let bnf = Bnf::try_from(grammar)?;
    let first = sets::gen_first(&bnf);
    let follow = sets::gen_follow(&bnf, &first);
    let table = table::build_table(&bnf, &first, &follow, config.on_conflict)?;
    debug!(
      "parser ready: {} terminals, {} non-terminals",
      bnf.num_terms(),
      bnf.num_nonterms(),
    );

    Ok(Parser {
      bnf,
      first,
      follow,
      table,
    })
  }

  pub fn bnf(&self) -> &Bnf {
    &self.bnf
  }

  pub fn first(&self) -> &FirstSets {
    &self.first
  }

  pub fn follow(&self) -> &FollowSets {
    &self.follow
  }

  pub fn table(&self) -> &ParseTable {
    &self.table
  }

  /// Resolves token names to terminals, appending the end-marker if the
  /// input lacks it.
  pub fn tokens<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Symbol>, Error> {
    let mut tokens = names.iter()
      .enumerate()
      .map(|(position, name)| {
        let name = name.as_ref();
        match self.bnf.symbol(name) {
          Some(sym @ Symbol::Term(_)) | Some(sym @ Symbol::End) => Ok(sym),
          _ => Err(Error::UnknownToken {
            token: name.to_owned(),
            position,
          }),
        }
      })
      .collect::<Result<Vec<_>, _>>()?;

    if tokens.last() != Some(&Symbol::End) {
      debug!("appending `{}` to the input", END_MARKER);
      tokens.push(Symbol::End);
    }
    Ok(tokens)
  }

  pub fn run(&self, tokens: &[Symbol]) -> Parse {
    driver::run(&self.table, &self.bnf, tokens)
  }

  pub fn parse<S: AsRef<str>>(&self, names: &[S]) -> Result<Parse, Error> {
    let tokens = self.tokens(names)?;
    Ok(self.run(&tokens))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::GrammarError;
  use crate::grammar::{grammar, tests::expr};
  use crate::parser::driver::{Outcome, Reason};
  use crate::parser::table::ConflictPolicy;
  use pretty_assertions::assert_eq;

  fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
  }

  #[test]
  fn parses_expression() {
    init();
    let parser = Parser::new(&expr(), &Config::default()).unwrap();
    let parse = parser.parse(&["a", "*", "(", "a", "+", "a", ")", "$"]).unwrap();
    assert!(parse.is_accepted());
  }

  #[test]
  fn end_marker_is_appended() {
    let parser = Parser::new(&expr(), &Config::default()).unwrap();
    let tokens = parser.tokens(&["a", "+", "a"]).unwrap();
    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[3], Symbol::End);
    assert!(parser.run(&tokens).is_accepted());
  }

  #[test]
  fn unknown_token() {
    let parser = Parser::new(&expr(), &Config::default()).unwrap();
    match parser.parse(&["a", "-", "a"]) {
      Err(Error::UnknownToken { token, position }) => {
        assert_eq!(token, "-");
        assert_eq!(position, 1);
      }
      other => panic!("expected an unknown token, got {:?}", other),
    }
    assert!(parser.tokens(&["E"]).is_err());
  }

  #[test]
  fn mismatch_located_at_paren() {
    let parser = Parser::new(&expr(), &Config::default()).unwrap();
    let parse = parser.parse(&["a", "*", "(", "a", "+", ")", "$"]).unwrap();
    match parse.outcome {
      Outcome::Rejected(rejection) => {
        assert_eq!(rejection.token.as_deref(), Some(")"));
        assert_eq!(rejection.reason, Reason::NoEntry { nonterm: "T".into() });
      }
      Outcome::Accepted => panic!("accepted `a * ( a + ) $`"),
    }
  }

  #[test]
  fn undeclared_start_never_builds_a_table() {
    let g = grammar(&["A"], &["a"], &[("A", "a")], "S");
    assert!(!g.is_context_free());
    match Parser::new(&g, &Config::default()) {
      Err(Error::GrammarInvalid(err)) => {
        assert_eq!(err, GrammarError::UndeclaredStart("S".into()));
      }
      other => panic!("expected an invalid grammar, got {:?}", other),
    }
  }

  #[test]
  fn conflict_policy_from_config() {
    init();
    let g = grammar(&["S"], &["a", "b"], &[("S", "a | a b")], "S");
    assert!(matches!(
      Parser::new(&g, &Config::default()),
      Err(Error::TableConflict { .. }),
    ));

    let config = Config {
      on_conflict: ConflictPolicy::FirstWins,
    };
    let parser = Parser::new(&g, &config).unwrap();
    assert_eq!(parser.table().conflicts().len(), 1);
    assert!(parser.parse(&["a"]).unwrap().is_accepted());
    assert!(!parser.parse(&["a", "b"]).unwrap().is_accepted());
  }

  #[test]
  fn left_recursive_grammar_under_first_wins() {
    init();
    let g = grammar(&["S"], &["a"], &[("S", "S a | e")], "S");
    let config = Config {
      on_conflict: ConflictPolicy::FirstWins,
    };
    let parser = Parser::new(&g, &config).unwrap();
    assert_eq!(parser.table().conflicts().len(), 1);

    match parser.parse(&["a", "$"]).unwrap().outcome {
      Outcome::Rejected(rejection) => {
        assert_eq!(rejection.reason, Reason::LeftRecursion { nonterm: "S".into() });
      }
      Outcome::Accepted => panic!("accepted through a left-recursive expansion"),
    }
  }
}

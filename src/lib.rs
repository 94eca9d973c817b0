pub mod bnf;
pub mod config;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod tree;

pub use bnf::{Bnf, Symbol};
pub use config::Config;
pub use error::{Error, GrammarError};
pub use grammar::Grammar;
pub use parser::driver::{run, Outcome, Parse, Rejection};
pub use parser::sets::{FirstSets, FollowSets};
pub use parser::table::{build_table, Action, ConflictPolicy, ParseTable};
pub use parser::Parser;
pub use tree::ParseTree;

pub fn build(grammar: &Grammar, config: &Config) -> Result<Parser, Error> {
  Parser::new(grammar, config)
}

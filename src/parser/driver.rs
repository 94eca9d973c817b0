use std::fmt::{self, Display, Formatter};

use log::trace;

use super::table::{Action, ParseTable};
use crate::bnf::*;
use crate::error::Error;
use crate::grammar::EPSILON;
use crate::tree::{NodeId, ParseTree};

/// Result of running the automaton over one token sequence.
#[derive(Debug, Clone)]
pub struct Parse {
  pub outcome: Outcome,
  /// Derivation recorded up to acceptance or the first failure.
  pub tree: ParseTree,
  pub steps: Vec<Step>,
  pub tokens: Vec<Symbol>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Accepted,
  Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
  pub reason: Reason,
  /// Index of the offending token.
  pub position: usize,
  /// `None` when the input ran out.
  pub token: Option<String>,
  /// Stack depth before the failing step.
  pub stack_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
  /// The table has no entry for the non-terminal on the lookahead.
  NoEntry {
    nonterm: String,
  },
  /// The top of the stack is a terminal or `$` that the lookahead doesn't
  /// match.
  Mismatch {
    expected: String,
  },
  InputExhausted,
  StackExhausted,
  /// `nonterm` was expanded twice at one position without anything beneath
  /// it being popped, so the automaton would never consume another token.
  LeftRecursion {
    nonterm: String,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
  /// Bottom first.
  pub stack: Vec<Symbol>,
  pub position: usize,
  pub action: StepAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
  Match(Symbol),
  Expand(ProdId),
  Accept,
  Error,
}

impl Parse {
  pub fn is_accepted(&self) -> bool {
    self.outcome == Outcome::Accepted
  }

  pub fn into_result(self) -> Result<ParseTree, Error> {
    match self.outcome {
      Outcome::Accepted => Ok(self.tree),
      Outcome::Rejected(rejection) => Err(Error::ParseRejected(rejection)),
    }
  }

  pub fn display_steps<'a>(&'a self, bnf: &'a Bnf) -> DisplaySteps<'a> {
    DisplaySteps {
      bnf,
      parse: self,
    }
  }
}

/// Runs the predictive parser. `tokens` should end with [`Symbol::End`].
pub fn run(
  table: &ParseTable,
  bnf: &Bnf,
  tokens: &[Symbol],
) -> Parse {
  let start = Symbol::Nonterm(bnf.start());
  let mut tree = ParseTree::new(start, bnf.name(start));
  // the end-marker's node is never expanded
  let mut stack: Vec<(Symbol, NodeId)> = vec![
    (Symbol::End, tree.root()),
    (start, tree.root()),
  ];
  let mut steps = vec![];
  let mut pos = 0;
  // non-terminals expanded at `pos`, with the stack depth beneath them
  let mut expanded: Vec<(NontermId, usize)> = vec![];

  let outcome = loop {
    let stack_depth = stack.len();
    let reject = |reason, token: Option<Symbol>| Outcome::Rejected(Rejection {
      reason,
      position: pos,
      token: token.map(|tok| bnf.name(tok).to_owned()),
      stack_depth,
    });

    let (top, node) = match stack.last() {
      Some(&entry) => entry,
      None => break reject(Reason::StackExhausted, tokens.get(pos).copied()),
    };
    let tok = match tokens.get(pos) {
      Some(&tok) => tok,
      None => break reject(Reason::InputExhausted, None),
    };
    trace!("top `{}`, lookahead `{}` at {}", bnf.name(top), bnf.name(tok), pos);

    let mut step = Step {
      stack: stack.iter().map(|&(sym, _)| sym).collect(),
      position: pos,
      action: StepAction::Error,
    };
    stack.pop();

    match (top, table.get(top, tok)) {
      (Symbol::End, Action::Accept) => {
        if pos + 1 < tokens.len() {
          steps.push(step);
          break reject(Reason::StackExhausted, Some(tok));
        }
        step.action = StepAction::Accept;
        steps.push(step);
        break Outcome::Accepted;
      }
      (Symbol::Term(_), Action::Pop) => {
        step.action = StepAction::Match(tok);
        steps.push(step);
        pos += 1;
        expanded.clear();
      }
      (Symbol::Nonterm(nonterm), Action::Expand(prod_id)) => {
        let base = stack.len();
        expanded.retain(|&(_, depth)| depth <= base);
        if expanded.iter().any(|&(seen, _)| seen == nonterm) {
          steps.push(step);
          break reject(Reason::LeftRecursion {
            nonterm: bnf.nonterm_name(nonterm).to_owned(),
          }, Some(tok));
        }
        expanded.push((nonterm, base));

        step.action = StepAction::Expand(prod_id);
        steps.push(step);

        let prod = bnf.prod(prod_id);
        if prod.is_epsilon() {
          tree.record_expansion(node, Some((Symbol::Epsilon, EPSILON)));
        } else {
          let children = tree.record_expansion(
            node,
            prod.symbols().iter().map(|&sym| (sym, bnf.name(sym))),
          );
          stack.extend(prod.symbols().iter()
            .copied()
            .zip(children)
            .rev());
        }
      }
      (Symbol::Nonterm(nonterm), _) => {
        steps.push(step);
        break reject(Reason::NoEntry {
          nonterm: bnf.nonterm_name(nonterm).to_owned(),
        }, Some(tok));
      }
      _ => {
        steps.push(step);
        break reject(Reason::Mismatch {
          expected: bnf.name(top).to_owned(),
        }, Some(tok));
      }
    }
  };

  match &outcome {
    Outcome::Accepted => trace!("accepted after {} steps", steps.len()),
    Outcome::Rejected(rejection) => trace!("rejected: {}", rejection),
  }

  Parse {
    outcome,
    tree,
    steps,
    tokens: tokens.to_vec(),
  }
}

impl Display for Reason {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Reason::NoEntry { nonterm } => write!(f, "no production of `{}` applies", nonterm),
      Reason::Mismatch { expected } => write!(f, "expected `{}`", expected),
      Reason::InputExhausted => write!(f, "input ended before the stack was empty"),
      Reason::StackExhausted => write!(f, "stack emptied before the end of input"),
      Reason::LeftRecursion { nonterm } => {
        write!(f, "`{}` expands to itself without consuming input", nonterm)
      }
    }
  }
}

impl Display for Rejection {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}", self.reason)?;
    if let Some(token) = &self.token {
      write!(f, " at `{}`", token)?;
    }
    write!(f, " (position {}, stack depth {})", self.position, self.stack_depth)
  }
}

/// Renders the trace as three columns: stack (top on the right), remaining
/// input, action.
pub struct DisplaySteps<'a> {
  bnf: &'a Bnf,
  parse: &'a Parse,
}

impl Display for DisplaySteps<'_> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let bnf = self.bnf;
    let join = |syms: &[Symbol]| {
      syms.iter().map(|&sym| bnf.name(sym)).collect::<Vec<_>>().join(" ")
    };

    let rows = self.parse.steps.iter()
      .map(|step| {
        let input = self.parse.tokens.get(step.position..).unwrap_or(&[]);
        let action = match step.action {
          StepAction::Match(sym) => format!("match {}", bnf.name(sym)),
          StepAction::Expand(prod) => format!("expand {}", bnf.display_prod(prod)),
          StepAction::Accept => "accept".to_owned(),
          StepAction::Error => "error".to_owned(),
        };
        (join(&step.stack), join(input), action)
      })
      .collect::<Vec<_>>();

    let stack_width = rows.iter().map(|row| row.0.chars().count()).max().unwrap_or(0);
    let input_width = rows.iter().map(|row| row.1.chars().count()).max().unwrap_or(0);
    for (stack, input, action) in &rows {
      writeln!(
        f,
        "{:<sw$}  {:<iw$}  {}",
        stack,
        input,
        action,
        sw = stack_width,
        iw = input_width,
      )?;
    }
    Ok(())
  }
}

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as _, ValueEnum};
use log::{error, info};

use ll1::{Config, ConflictPolicy, Error, Grammar, Outcome, Parser};

/// Builds an LL(1) parser from a grammar file and runs it over a token
/// sequence.
#[derive(Debug, clap::Parser)]
#[command(name = "ll1", version)]
struct Args {
  /// Grammar file (`Non-terminals:`, `Terminals:`, `Productions:`, `Start:`)
  grammar: PathBuf,

  /// Input terminals; `$` is appended when missing. Without tokens only the
  /// sets and the table are produced.
  tokens: Vec<String>,

  /// How to resolve two alternatives claiming the same table cell
  #[arg(long, value_enum, default_value_t = OnConflict::Reject)]
  on_conflict: OnConflict,

  /// Also write PREFIX_first.txt, PREFIX_follow.txt, PREFIX_table.txt and
  /// PREFIX_tree.txt
  #[arg(long, value_name = "PREFIX")]
  save: Option<String>,

  /// Print the alternatives of NON_TERMINAL (may be repeated)
  #[arg(long, value_name = "NON_TERMINAL")]
  productions_for: Vec<String>,

  /// Only print the outcome
  #[arg(short, long)]
  quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnConflict {
  Reject,
  FirstWins,
  LastWins,
}

impl From<OnConflict> for ConflictPolicy {
  fn from(policy: OnConflict) -> Self {
    match policy {
      OnConflict::Reject => ConflictPolicy::Reject,
      OnConflict::FirstWins => ConflictPolicy::FirstWins,
      OnConflict::LastWins => ConflictPolicy::LastWins,
    }
  }
}

fn main() -> ExitCode {
  env_logger::init();
  let args = Args::parse();

  match run(&args) {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::from(1),
    Err(err) => {
      error!("{}", err);
      eprintln!("error: {}", err);
      ExitCode::from(2)
    }
  }
}

/// Returns whether the input was accepted.
fn run(args: &Args) -> Result<bool, Error> {
  let grammar = Grammar::from_file(&args.grammar)?;
  info!("read grammar from {}", args.grammar.display());
  if !args.quiet {
    print!("{}", grammar);
  }
  for non_terminal in &args.productions_for {
    println!("{}", grammar.display_productions_for(non_terminal));
  }
  if !args.quiet {
    println!("Is the grammar context-free? {}", grammar.is_context_free());
  }

  let config = Config {
    on_conflict: args.on_conflict.into(),
  };
  let parser = Parser::new(&grammar, &config)?;
  let bnf = parser.bnf();

  let first = parser.first().display(bnf).to_string();
  let follow = parser.follow().display(bnf).to_string();
  let table = parser.table().display(bnf).to_string();
  if !args.quiet {
    println!("\n{}\n{}\nParse table:\n{}", first, follow, table);
  }
  if let Some(prefix) = &args.save {
    save(format!("{}_first.txt", prefix), &first)?;
    save(format!("{}_follow.txt", prefix), &follow)?;
    save(format!("{}_table.txt", prefix), &table)?;
  }

  let names = args.tokens.iter()
    .flat_map(|arg| arg.split_whitespace())
    .collect::<Vec<_>>();
  if names.is_empty() {
    return Ok(true);
  }
  let parse = parser.parse(&names[..])?;

  if !args.quiet {
    println!("Parsing steps:\n{}", parse.display_steps(bnf));
  }
  let accepted = match &parse.outcome {
    Outcome::Accepted => {
      println!("Input successfully parsed!");
      if !args.quiet {
        println!("\nParse tree:\n{}", parse.tree);
      }
      true
    }
    Outcome::Rejected(rejection) => {
      println!("Input rejected: {}", rejection);
      false
    }
  };

  if let (Some(prefix), true) = (&args.save, accepted) {
    let tree = format!("{}\n{}", parse.tree, parse.tree.display_nodes());
    save(format!("{}_tree.txt", prefix), &tree)?;
  }

  Ok(accepted)
}

fn save(path: String, contents: &str) -> Result<(), Error> {
  info!("writing {}", path);
  fs::write(&path, contents).map_err(|source| Error::Io {
    path,
    source,
  })
}

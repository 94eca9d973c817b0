use crate::parser::table::ConflictPolicy;

/// Options for building a [`Parser`](crate::Parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
  /// How table conflicts between alternatives are handled. Rejecting is the
  /// default, the other policies only make sense for grammars known to be
  /// ambiguous in a harmless way.
  pub on_conflict: ConflictPolicy,
}

//! File format readers and writers for board rules.
//!
//! The only format here is the JSON rules scope: a named snapshot of the
//! clearance matrix, net classes, padstacks and via definitions that survives
//! a round trip losslessly and applies to a board as one atomic batch.

pub mod rules_file;

pub use rules_file::{
    apply_scope, read_scope, scope_from_board, write_scope, RulesFileError, RulesScope,
};
